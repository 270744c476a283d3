//! Swagger 2.0 → OpenAPI 3.0.

use indexmap::IndexMap;

use crate::error::ConvertError;
use crate::fixup;
use crate::parse;
use crate::parse::components::Components;
use crate::parse::media_type::{
    APPLICATION_JSON, FORM_URLENCODED, MULTIPART_FORM_DATA, MediaType,
};
use crate::parse::operation::{HttpMethod, Operation, PathItem};
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::ref_resolve::{
    OPENAPI_PARAMETERS, OPENAPI_REQUEST_BODIES, OPENAPI_RESPONSES, SWAGGER_PARAMETERS,
    SWAGGER_RESPONSES, make_ref, parse_ref_name, rewrite_ref,
};
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::response::{Header, HeaderOrRef, Response, ResponseOrRef};
use crate::parse::schema::{Schema, SchemaOrRef, SchemaType};
use crate::parse::security::{
    OAuthFlow, OAuthFlows, SecurityScheme, SecuritySchemeType,
};
use crate::parse::server::Server;
use crate::parse::spec::OpenApiSpec;
use crate::parse::swagger::{
    SwaggerHeader, SwaggerOAuthFlow, SwaggerOperation, SwaggerParameter,
    SwaggerParameterLocation, SwaggerParameterOrRef, SwaggerPathItem, SwaggerResponse,
    SwaggerResponseOrRef, SwaggerSecurityScheme, SwaggerSecurityType, SwaggerSpec,
};
use crate::transform::swagger_schema;
use crate::version::SpecVersion;

pub const STEP: &str = "Swagger 2.0 to OpenAPI 3.0";

/// Convert a rendered Swagger document into a rendered OpenAPI 3.0 document.
pub fn convert(data: &[u8]) -> Result<Vec<u8>, ConvertError> {
    let mut swagger: SwaggerSpec = parse::load(data, STEP)?;
    fixup::fix_upload_formats(&mut swagger);
    let spec = upgrade(swagger)?;
    parse::render(&spec)
}

/// Media types in effect for an operation.
struct MediaTypes<'a> {
    consumes: &'a [String],
    produces: &'a [String],
}

impl<'a> MediaTypes<'a> {
    fn narrowed(&self, operation: &'a SwaggerOperation) -> MediaTypes<'a> {
        MediaTypes {
            consumes: pick(&operation.consumes, self.consumes),
            produces: pick(&operation.produces, self.produces),
        }
    }
}

fn pick<'a>(own: &'a [String], inherited: &'a [String]) -> &'a [String] {
    if own.is_empty() { inherited } else { own }
}

/// Media types for a body, defaulting to JSON.
fn or_json(media_types: &[String]) -> Vec<String> {
    if media_types.is_empty() {
        vec![APPLICATION_JSON.to_string()]
    } else {
        media_types.to_vec()
    }
}

/// Convert a parsed Swagger document into OpenAPI 3.0.
pub fn upgrade(swagger: SwaggerSpec) -> Result<OpenApiSpec, ConvertError> {
    let servers = servers(
        swagger.host.as_deref(),
        swagger.base_path.as_deref(),
        &swagger.schemes,
    )?;

    let document_media = MediaTypes {
        consumes: &swagger.consumes,
        produces: &swagger.produces,
    };

    let mut paths = IndexMap::new();
    for (path, item) in &swagger.paths {
        let item = convert_path_item(item, &document_media, &swagger.parameters)?;
        paths.insert(path.clone(), item);
    }

    let mut components = Components::default();
    for (name, schema) in &swagger.definitions {
        let mut schema = schema.clone();
        swagger_schema::to_openapi(&mut schema);
        components.schemas.insert(name.clone(), schema);
    }
    for (name, parameter) in &swagger.parameters {
        match parameter.location {
            SwaggerParameterLocation::Body => {
                let body = body_to_request_body(parameter, &or_json(&swagger.consumes));
                components
                    .request_bodies
                    .insert(name.clone(), RequestBodyOrRef::RequestBody(body));
            }
            // Inlined wherever they are referenced.
            SwaggerParameterLocation::FormData => {}
            _ => {
                let parameter = convert_parameter(parameter)?;
                components
                    .parameters
                    .insert(name.clone(), ParameterOrRef::Parameter(parameter));
            }
        }
    }
    for (name, response) in &swagger.responses {
        let response = convert_response(response, &or_json(&swagger.produces));
        components
            .responses
            .insert(name.clone(), ResponseOrRef::Response(response));
    }
    for (name, scheme) in &swagger.security_definitions {
        components
            .security_schemes
            .insert(name.clone(), convert_security_scheme(scheme));
    }

    Ok(OpenApiSpec {
        openapi: SpecVersion::OpenApi30.document_version().to_string(),
        info: swagger.info,
        json_schema_dialect: None,
        servers,
        paths,
        webhooks: None,
        components: (!components.is_empty()).then_some(components),
        security: swagger.security,
        tags: swagger.tags,
        external_docs: swagger.external_docs,
        extensions: swagger.extensions,
    })
}

fn servers(
    host: Option<&str>,
    base_path: Option<&str>,
    schemes: &[String],
) -> Result<Vec<Server>, ConvertError> {
    let Some(host) = host.filter(|h| !h.is_empty()) else {
        return Ok(base_path
            .filter(|p| !p.is_empty())
            .map(|p| vec![Server::new(p)])
            .unwrap_or_default());
    };
    if host.contains('/') {
        return Err(ConvertError::step(
            STEP,
            format!("invalid host {host:?}: a host cannot contain a path"),
        ));
    }

    let base_path = base_path.filter(|p| !p.is_empty()).unwrap_or("/");
    let schemes: Vec<&str> = if schemes.is_empty() {
        vec!["https"]
    } else {
        schemes.iter().map(String::as_str).collect()
    };
    Ok(schemes
        .into_iter()
        .map(|scheme| Server::new(format!("{scheme}://{host}{base_path}")))
        .collect())
}

fn convert_path_item(
    item: &SwaggerPathItem,
    document_media: &MediaTypes<'_>,
    globals: &IndexMap<String, SwaggerParameter>,
) -> Result<PathItem, ConvertError> {
    let shared = sort_parameters(&item.parameters, globals)?;

    let mut converted = PathItem {
        ref_path: item.ref_path.clone(),
        parameters: shared.parameters,
        extensions: item.extensions.clone(),
        ..PathItem::default()
    };

    for (method, operation) in item.operations() {
        let media = document_media.narrowed(operation);
        let mut own = sort_parameters(&operation.parameters, globals)?;
        if own.body.is_none() && own.form.is_empty() {
            own.body = shared.body.clone();
            own.form = shared.form.clone();
        }

        let request_body = match (own.body, own.form.is_empty()) {
            (Some(BodySource::Ref(name)), _) => Some(RequestBodyOrRef::Ref {
                ref_path: make_ref(OPENAPI_REQUEST_BODIES, &name),
            }),
            (Some(BodySource::Inline(parameter)), _) => Some(RequestBodyOrRef::RequestBody(
                body_to_request_body(&parameter, &or_json(media.consumes)),
            )),
            (None, false) => Some(RequestBodyOrRef::RequestBody(form_to_request_body(
                &own.form,
                media.consumes,
            ))),
            (None, true) => None,
        };

        let produces = or_json(media.produces);
        let responses = operation
            .responses
            .iter()
            .map(|(status, response)| {
                let response = match response {
                    SwaggerResponseOrRef::Ref { ref_path } => ResponseOrRef::Ref {
                        ref_path: rewrite_ref(ref_path, SWAGGER_RESPONSES, OPENAPI_RESPONSES),
                    },
                    SwaggerResponseOrRef::Response(response) => {
                        ResponseOrRef::Response(convert_response(response, &produces))
                    }
                };
                (status.clone(), response)
            })
            .collect();

        let converted_operation = Operation {
            tags: operation.tags.clone(),
            summary: operation.summary.clone(),
            description: operation.description.clone(),
            external_docs: operation.external_docs.clone(),
            operation_id: operation.operation_id.clone(),
            parameters: own.parameters,
            request_body,
            responses,
            deprecated: operation.deprecated,
            security: operation.security.clone(),
            extensions: operation.extensions.clone(),
            ..Operation::default()
        };
        set_operation(&mut converted, method, converted_operation);
    }

    Ok(converted)
}

fn set_operation(item: &mut PathItem, method: HttpMethod, operation: Operation) {
    let slot = match method {
        HttpMethod::Get => &mut item.get,
        HttpMethod::Put => &mut item.put,
        HttpMethod::Post => &mut item.post,
        HttpMethod::Delete => &mut item.delete,
        HttpMethod::Options => &mut item.options,
        HttpMethod::Head => &mut item.head,
        HttpMethod::Patch => &mut item.patch,
    };
    *slot = Some(operation);
}

#[derive(Debug, Clone)]
enum BodySource {
    /// Name of a global body parameter.
    Ref(String),
    Inline(SwaggerParameter),
}

/// A Swagger parameter list split by where each entry ends up in 3.0.
#[derive(Debug, Default)]
struct SortedParameters {
    parameters: Vec<ParameterOrRef>,
    body: Option<BodySource>,
    form: Vec<SwaggerParameter>,
}

fn sort_parameters(
    parameters: &[SwaggerParameterOrRef],
    globals: &IndexMap<String, SwaggerParameter>,
) -> Result<SortedParameters, ConvertError> {
    let mut sorted = SortedParameters::default();
    for parameter in parameters {
        match parameter {
            SwaggerParameterOrRef::Ref { ref_path } => {
                let name = parse_ref_name(ref_path, SWAGGER_PARAMETERS)
                    .map_err(|e| ConvertError::step(STEP, e.to_string()))?;
                let Some(global) = globals.get(&name) else {
                    return Err(ConvertError::step(
                        STEP,
                        format!("parameter reference {ref_path} not found"),
                    ));
                };
                match global.location {
                    SwaggerParameterLocation::Body => sorted.body = Some(BodySource::Ref(name)),
                    SwaggerParameterLocation::FormData => sorted.form.push(global.clone()),
                    _ => sorted.parameters.push(ParameterOrRef::Ref {
                        ref_path: make_ref(OPENAPI_PARAMETERS, &name),
                    }),
                }
            }
            SwaggerParameterOrRef::Parameter(parameter) => match parameter.location {
                SwaggerParameterLocation::Body => {
                    sorted.body = Some(BodySource::Inline(parameter.clone()));
                }
                SwaggerParameterLocation::FormData => sorted.form.push(parameter.clone()),
                _ => sorted
                    .parameters
                    .push(ParameterOrRef::Parameter(convert_parameter(parameter)?)),
            },
        }
    }
    Ok(sorted)
}

fn convert_parameter(parameter: &SwaggerParameter) -> Result<Parameter, ConvertError> {
    let location = match parameter.location {
        SwaggerParameterLocation::Query => ParameterLocation::Query,
        SwaggerParameterLocation::Header => ParameterLocation::Header,
        SwaggerParameterLocation::Path => ParameterLocation::Path,
        SwaggerParameterLocation::Body | SwaggerParameterLocation::FormData => {
            return Err(ConvertError::step(
                STEP,
                format!("parameter {:?} cannot be a 3.0 parameter", parameter.name),
            ));
        }
    };

    let mut schema = SchemaOrRef::inline(parameter.value_schema());
    swagger_schema::to_openapi(&mut schema);

    let (style, explode) = match parameter.collection_format.as_deref() {
        Some("csv") if location == ParameterLocation::Query => (Some("form"), Some(false)),
        Some("csv") => (Some("simple"), None),
        Some("ssv") => (Some("spaceDelimited"), Some(false)),
        Some("pipes") => (Some("pipeDelimited"), Some(false)),
        Some("multi") => (Some("form"), Some(true)),
        Some(other) => {
            log::warn!(
                "parameter {:?}: collectionFormat {other:?} has no 3.0 style",
                parameter.name
            );
            (None, None)
        }
        None => (None, None),
    };

    Ok(Parameter {
        name: parameter.name.clone(),
        location,
        description: parameter.description.clone(),
        required: parameter.required,
        deprecated: None,
        allow_empty_value: parameter.allow_empty_value,
        schema: Some(schema),
        content: IndexMap::new(),
        style: style.map(str::to_string),
        explode,
        example: None,
        extensions: parameter.extensions.clone(),
    })
}

fn body_to_request_body(parameter: &SwaggerParameter, consumes: &[String]) -> RequestBody {
    let mut schema = parameter.schema.clone();
    if let Some(schema) = schema.as_mut() {
        swagger_schema::to_openapi(schema);
    }

    let content = consumes
        .iter()
        .map(|media_type| {
            let entry = MediaType {
                schema: schema.clone(),
                ..MediaType::default()
            };
            (media_type.clone(), entry)
        })
        .collect();

    RequestBody {
        description: parameter.description.clone(),
        content,
        required: parameter.required.then_some(true),
        extensions: parameter.extensions.clone(),
    }
}

/// All `formData` parameters of an operation become one object schema.
fn form_to_request_body(form: &[SwaggerParameter], consumes: &[String]) -> RequestBody {
    let has_file = form
        .iter()
        .any(|parameter| parameter.param_type == Some(SchemaType::File));
    let media_type = if has_file || consumes.iter().any(|m| m == MULTIPART_FORM_DATA) {
        MULTIPART_FORM_DATA
    } else {
        FORM_URLENCODED
    };

    let mut object = Schema::of_type(SchemaType::Object);
    for parameter in form {
        let mut property = SchemaOrRef::inline(Schema {
            description: parameter.description.clone(),
            ..parameter.value_schema()
        });
        swagger_schema::to_openapi(&mut property);
        object.properties.insert(parameter.name.clone(), property);
        if parameter.required {
            object.required.push(parameter.name.clone());
        }
    }

    let mut content = IndexMap::new();
    content.insert(
        media_type.to_string(),
        MediaType::with_schema(SchemaOrRef::inline(object)),
    );
    RequestBody {
        content,
        ..RequestBody::default()
    }
}

fn convert_response(response: &SwaggerResponse, produces: &[String]) -> Response {
    let mut schema = response.schema.clone();
    if let Some(schema) = schema.as_mut() {
        swagger_schema::to_openapi(schema);
    }

    let mut content = IndexMap::new();
    if schema.is_some() {
        for media_type in produces {
            let entry = MediaType {
                schema: schema.clone(),
                example: response.examples.get(media_type).cloned(),
                ..MediaType::default()
            };
            content.insert(media_type.clone(), entry);
        }
    }
    for (media_type, example) in &response.examples {
        content
            .entry(media_type.clone())
            .or_insert_with(|| MediaType {
                example: Some(example.clone()),
                ..MediaType::default()
            });
    }

    let headers = response
        .headers
        .iter()
        .map(|(name, header)| (name.clone(), HeaderOrRef::Header(convert_header(header))))
        .collect();

    Response {
        description: response.description.clone(),
        headers,
        content,
        links: IndexMap::new(),
        extensions: response.extensions.clone(),
    }
}

fn convert_header(header: &SwaggerHeader) -> Header {
    let mut schema = SchemaOrRef::inline(header.schema.clone());
    swagger_schema::to_openapi(&mut schema);
    Header {
        description: header.description.clone(),
        schema: Some(schema),
        ..Header::default()
    }
}

fn convert_security_scheme(scheme: &SwaggerSecurityScheme) -> SecurityScheme {
    let mut converted = SecurityScheme {
        scheme_type: SecuritySchemeType::ApiKey,
        description: scheme.description.clone(),
        name: None,
        location: None,
        scheme: None,
        bearer_format: None,
        flows: None,
        open_id_connect_url: None,
        extensions: scheme.extensions.clone(),
    };

    match scheme.scheme_type {
        SwaggerSecurityType::Basic => {
            converted.scheme_type = SecuritySchemeType::Http;
            converted.scheme = Some("basic".to_string());
        }
        SwaggerSecurityType::ApiKey => {
            converted.name = scheme.name.clone();
            converted.location = scheme.location;
        }
        SwaggerSecurityType::OAuth2 => {
            converted.scheme_type = SecuritySchemeType::OAuth2;
            let flow = OAuthFlow {
                authorization_url: scheme.authorization_url.clone(),
                token_url: scheme.token_url.clone(),
                refresh_url: None,
                scopes: scheme.scopes.clone(),
            };
            let mut flows = OAuthFlows::default();
            match scheme.flow {
                Some(SwaggerOAuthFlow::Implicit) => flows.implicit = Some(flow),
                Some(SwaggerOAuthFlow::Password) => flows.password = Some(flow),
                Some(SwaggerOAuthFlow::Application) => flows.client_credentials = Some(flow),
                Some(SwaggerOAuthFlow::AccessCode) => flows.authorization_code = Some(flow),
                None => log::warn!("oauth2 security scheme without a flow"),
            }
            converted.flows = Some(flows);
        }
    }

    converted
}
