//! OpenAPI 3.0 → Swagger 2.0.

use indexmap::IndexMap;

use crate::error::ConvertError;
use crate::fixup;
use crate::parse;
use crate::parse::media_type::{APPLICATION_JSON, Content};
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::ref_resolve::{
    OPENAPI_PARAMETERS, OPENAPI_REQUEST_BODIES, OPENAPI_RESPONSES, OPENAPI_SCHEMAS,
    SWAGGER_PARAMETERS, SWAGGER_RESPONSES, make_ref, parse_ref_name, rewrite_ref,
};
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::response::{HeaderOrRef, Response, ResponseOrRef};
use crate::parse::schema::{Schema, SchemaOrRef, SchemaType};
use crate::parse::security::{
    ApiKeyLocation, OAuthFlow, SecurityScheme, SecuritySchemeType,
};
use crate::parse::server::split_url;
use crate::parse::spec::OpenApiSpec;
use crate::parse::swagger::{
    SwaggerHeader, SwaggerOAuthFlow, SwaggerOperation, SwaggerParameter,
    SwaggerParameterLocation, SwaggerParameterOrRef, SwaggerPathItem, SwaggerResponse,
    SwaggerResponseOrRef, SwaggerSecurityScheme, SwaggerSecurityType, SwaggerSpec,
};
use crate::transform::{self, rules, swagger_schema};
use crate::version::SpecVersion;

pub const STEP: &str = "OpenAPI 3.0 to Swagger 2.0";

/// How deep a chain of schema references is followed when a parameter or
/// header needs its value fields flattened.
const MAX_REF_DEPTH: usize = 16;

/// Convert a rendered OpenAPI 3.0 document into a rendered Swagger document.
pub fn convert(data: &[u8]) -> Result<Vec<u8>, ConvertError> {
    let mut spec: OpenApiSpec = parse::load(data, STEP)?;
    let swagger = downgrade(&mut spec)?;
    parse::render(&swagger)
}

/// Convert a parsed OpenAPI 3.0 document into Swagger, including the
/// read-only/required reconciliation, request body reattachment and upload
/// format correction. Inline request-body content is detached from `spec`.
pub fn downgrade(spec: &mut OpenApiSpec) -> Result<SwaggerSpec, ConvertError> {
    transform::apply_to_document(spec, rules::DOWNGRADE_30_TO_SWAGGER);
    let contents = fixup::extract_request_body_content(spec);
    let mut swagger = convert_document(spec)?;
    fixup::insert_body_parameters(&mut swagger, contents);
    fixup::fix_upload_formats(&mut swagger);
    Ok(swagger)
}

/// The structural conversion alone. Inline request bodies are skipped.
fn convert_document(spec: &OpenApiSpec) -> Result<SwaggerSpec, ConvertError> {
    let empty = Default::default();
    let components = spec.components.as_ref().unwrap_or(&empty);
    let resolver = SchemaResolver {
        schemas: &components.schemas,
    };

    let mut swagger = SwaggerSpec {
        swagger: SpecVersion::Swagger.document_version().to_string(),
        info: spec.info.clone(),
        host: None,
        base_path: None,
        schemes: Vec::new(),
        consumes: Vec::new(),
        produces: Vec::new(),
        paths: IndexMap::new(),
        definitions: IndexMap::new(),
        parameters: IndexMap::new(),
        responses: IndexMap::new(),
        security_definitions: IndexMap::new(),
        security: spec.security.clone(),
        tags: spec.tags.clone(),
        external_docs: spec.external_docs.clone(),
        extensions: spec.extensions.clone(),
    };

    for (index, server) in spec.servers.iter().enumerate() {
        let parts = split_url(&server.expanded_url());
        if let Some(scheme) = parts.scheme {
            if !swagger.schemes.contains(&scheme) {
                swagger.schemes.push(scheme);
            }
        }
        if index == 0 {
            swagger.host = parts.host;
            swagger.base_path = parts.base_path;
        }
    }

    for (name, schema) in &components.schemas {
        let mut schema = schema.clone();
        swagger_schema::to_swagger(&mut schema);
        swagger.definitions.insert(name.clone(), schema);
    }
    for (name, parameter) in &components.parameters {
        match parameter {
            ParameterOrRef::Parameter(parameter) => {
                if let Some(converted) = convert_parameter(parameter, &resolver) {
                    swagger.parameters.insert(name.clone(), converted);
                }
            }
            ParameterOrRef::Ref { ref_path } => {
                log::warn!("component parameter {name:?} is a reference to {ref_path}; dropped");
            }
        }
    }
    for (name, body) in &components.request_bodies {
        let RequestBodyOrRef::RequestBody(body) = body else {
            log::warn!("component request body {name:?} is a reference; dropped");
            continue;
        };
        if swagger.parameters.contains_key(name) {
            log::warn!("component request body {name:?} clashes with a parameter; dropped");
            continue;
        }
        swagger
            .parameters
            .insert(name.clone(), request_body_to_parameter(name, body));
    }
    for (name, response) in &components.responses {
        match response {
            ResponseOrRef::Response(response) => {
                let converted = convert_response(response, &resolver, &mut Vec::new());
                swagger.responses.insert(name.clone(), converted);
            }
            ResponseOrRef::Ref { ref_path } => {
                log::warn!("component response {name:?} is a reference to {ref_path}; dropped");
            }
        }
    }
    for (name, scheme) in &components.security_schemes {
        swagger
            .security_definitions
            .insert(name.clone(), convert_security_scheme(name, scheme)?);
    }

    for (path, item) in &spec.paths {
        swagger
            .paths
            .insert(path.clone(), convert_path_item(path, item, &resolver)?);
    }

    Ok(swagger)
}

/// Looks schemas up in `components.schemas` so a referenced parameter or
/// header schema can be flattened into Swagger's value fields.
struct SchemaResolver<'a> {
    schemas: &'a IndexMap<String, SchemaOrRef>,
}

impl<'a> SchemaResolver<'a> {
    fn resolve(&self, schema: &'a SchemaOrRef) -> Option<&'a Schema> {
        let mut current = schema;
        for _ in 0..MAX_REF_DEPTH {
            match current {
                SchemaOrRef::Schema(schema) => return Some(schema),
                SchemaOrRef::Ref { ref_path, .. } => {
                    let name = parse_ref_name(ref_path, OPENAPI_SCHEMAS).ok()?;
                    current = self.schemas.get(&name)?;
                }
                SchemaOrRef::Bool(_) => return None,
            }
        }
        None
    }

    /// The Swagger form of the value schema behind `schema`.
    fn value_schema(&self, schema: Option<&'a SchemaOrRef>) -> Schema {
        let Some(schema) = schema else {
            return Schema::default();
        };
        let Some(resolved) = self.resolve(schema) else {
            log::warn!("cannot resolve {schema:?} for a parameter or header; left untyped");
            return Schema::default();
        };
        let mut converted = SchemaOrRef::inline(resolved.clone());
        swagger_schema::to_swagger(&mut converted);
        match converted {
            SchemaOrRef::Schema(schema) => *schema,
            SchemaOrRef::Ref { .. } | SchemaOrRef::Bool(_) => Schema::default(),
        }
    }
}

fn convert_path_item(
    path: &str,
    item: &PathItem,
    resolver: &SchemaResolver<'_>,
) -> Result<SwaggerPathItem, ConvertError> {
    let mut converted = SwaggerPathItem {
        ref_path: item.ref_path.clone(),
        parameters: convert_parameters(&item.parameters, resolver),
        extensions: item.extensions.clone(),
        ..SwaggerPathItem::default()
    };

    if item.trace.is_some() {
        log::warn!("{path}: trace operations have no Swagger counterpart; dropped");
    }

    for (method, operation) in item.operations() {
        converted.set_operation(method, convert_operation(operation, resolver)?);
    }

    Ok(converted)
}

fn convert_operation(
    operation: &Operation,
    resolver: &SchemaResolver<'_>,
) -> Result<SwaggerOperation, ConvertError> {
    let mut parameters = convert_parameters(&operation.parameters, resolver);

    match &operation.request_body {
        Some(RequestBodyOrRef::Ref { ref_path }) => {
            let name = parse_ref_name(ref_path, OPENAPI_REQUEST_BODIES)
                .map_err(|e| ConvertError::step(STEP, e.to_string()))?;
            parameters.push(SwaggerParameterOrRef::Ref {
                ref_path: make_ref(SWAGGER_PARAMETERS, &name),
            });
        }
        // Inline bodies are reattached after conversion.
        Some(RequestBodyOrRef::RequestBody(_)) | None => {}
    }

    let mut produces = Vec::new();
    let responses = operation
        .responses
        .iter()
        .map(|(status, response)| {
            let converted = match response {
                ResponseOrRef::Ref { ref_path } => SwaggerResponseOrRef::Ref {
                    ref_path: rewrite_ref(ref_path, OPENAPI_RESPONSES, SWAGGER_RESPONSES),
                },
                ResponseOrRef::Response(response) => SwaggerResponseOrRef::Response(
                    convert_response(response, resolver, &mut produces),
                ),
            };
            (status.clone(), converted)
        })
        .collect();

    Ok(SwaggerOperation {
        tags: operation.tags.clone(),
        summary: operation.summary.clone(),
        description: operation.description.clone(),
        external_docs: operation.external_docs.clone(),
        operation_id: operation.operation_id.clone(),
        consumes: Vec::new(),
        produces,
        parameters,
        responses,
        schemes: Vec::new(),
        deprecated: operation.deprecated,
        security: operation.security.clone(),
        extensions: operation.extensions.clone(),
    })
}

fn convert_parameters(
    parameters: &[ParameterOrRef],
    resolver: &SchemaResolver<'_>,
) -> Vec<SwaggerParameterOrRef> {
    parameters
        .iter()
        .filter_map(|parameter| match parameter {
            ParameterOrRef::Ref { ref_path } => Some(SwaggerParameterOrRef::Ref {
                ref_path: rewrite_ref(ref_path, OPENAPI_PARAMETERS, SWAGGER_PARAMETERS),
            }),
            ParameterOrRef::Parameter(parameter) => {
                convert_parameter(parameter, resolver).map(SwaggerParameterOrRef::Parameter)
            }
        })
        .collect()
}

/// Flatten a 3.0 parameter. Cookie parameters have no Swagger location and
/// are dropped.
fn convert_parameter(
    parameter: &Parameter,
    resolver: &SchemaResolver<'_>,
) -> Option<SwaggerParameter> {
    let location = match parameter.location {
        ParameterLocation::Query => SwaggerParameterLocation::Query,
        ParameterLocation::Header => SwaggerParameterLocation::Header,
        ParameterLocation::Path => SwaggerParameterLocation::Path,
        ParameterLocation::Cookie => {
            log::warn!("cookie parameter {:?} dropped", parameter.name);
            return None;
        }
    };

    let schema_source = parameter
        .schema
        .as_ref()
        .or_else(|| parameter.content.values().find_map(|m| m.schema.as_ref()));
    let schema = resolver.value_schema(schema_source);

    let mut converted = SwaggerParameter::new(parameter.name.clone(), location);
    converted.description = parameter.description.clone();
    converted.required = parameter.required;
    converted.allow_empty_value = parameter.allow_empty_value;
    converted.apply_value_schema(&schema);
    if converted.param_type == Some(SchemaType::Array) {
        converted.collection_format = collection_format(parameter).map(str::to_string);
    }
    converted.extensions = parameter.extensions.clone();
    Some(converted)
}

/// The Swagger `collectionFormat` for a parameter's `style`/`explode`. An
/// absent style means `form` in the query and `simple` elsewhere.
fn collection_format(parameter: &Parameter) -> Option<&'static str> {
    let style = parameter.style.as_deref().unwrap_or(match parameter.location {
        ParameterLocation::Query | ParameterLocation::Cookie => "form",
        _ => "simple",
    });
    let explode = parameter.explode.unwrap_or(style == "form");
    match style {
        "form" if explode => Some("multi"),
        "form" | "simple" => Some("csv"),
        "spaceDelimited" => Some("ssv"),
        "pipeDelimited" => Some("pipes"),
        _ => None,
    }
}

/// A component request body as a global body parameter.
fn request_body_to_parameter(name: &str, body: &RequestBody) -> SwaggerParameter {
    let mut parameter = SwaggerParameter::new(name, SwaggerParameterLocation::Body);
    parameter.description = body.description.clone();
    parameter.required = body.required.unwrap_or(false);
    parameter.schema = preferred_schema(&body.content).map(|mut schema| {
        swagger_schema::to_swagger(&mut schema);
        schema
    });
    parameter.extensions = body.extensions.clone();
    parameter
}

/// The `application/json` schema, else the first media type's.
fn preferred_schema(content: &Content) -> Option<SchemaOrRef> {
    content
        .get(APPLICATION_JSON)
        .or_else(|| content.values().next())
        .and_then(|media_type| media_type.schema.clone())
}

fn convert_response(
    response: &Response,
    resolver: &SchemaResolver<'_>,
    produces: &mut Vec<String>,
) -> SwaggerResponse {
    for media_type in response.content.keys() {
        if !produces.contains(media_type) {
            produces.push(media_type.clone());
        }
    }

    let schema = preferred_schema(&response.content).map(|mut schema| {
        swagger_schema::to_swagger(&mut schema);
        schema
    });

    let examples = response
        .content
        .iter()
        .filter_map(|(media_type, entry)| {
            entry
                .example
                .clone()
                .map(|example| (media_type.clone(), example))
        })
        .collect();

    let headers = response
        .headers
        .iter()
        .filter_map(|(name, header)| match header {
            HeaderOrRef::Header(header) => Some((
                name.clone(),
                SwaggerHeader {
                    description: header.description.clone(),
                    schema: resolver.value_schema(header.schema.as_ref()),
                },
            )),
            HeaderOrRef::Ref { ref_path } => {
                log::warn!("response header {name:?} is a reference to {ref_path}; dropped");
                None
            }
        })
        .collect();

    SwaggerResponse {
        description: response.description.clone(),
        schema,
        headers,
        examples,
        extensions: response.extensions.clone(),
    }
}

fn convert_security_scheme(
    name: &str,
    scheme: &SecurityScheme,
) -> Result<SwaggerSecurityScheme, ConvertError> {
    let mut converted = SwaggerSecurityScheme {
        scheme_type: SwaggerSecurityType::ApiKey,
        description: scheme.description.clone(),
        name: None,
        location: None,
        flow: None,
        authorization_url: None,
        token_url: None,
        scopes: IndexMap::new(),
        extensions: scheme.extensions.clone(),
    };

    match scheme.scheme_type {
        SecuritySchemeType::Http
            if scheme
                .scheme
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("basic")) =>
        {
            converted.scheme_type = SwaggerSecurityType::Basic;
        }
        SecuritySchemeType::Http => {
            converted.name = Some("Authorization".to_string());
            converted.location = Some(ApiKeyLocation::Header);
        }
        SecuritySchemeType::ApiKey => {
            if scheme.location == Some(ApiKeyLocation::Cookie) {
                return Err(ConvertError::step(
                    STEP,
                    format!("security scheme {name:?}: cookie API keys are not supported"),
                ));
            }
            converted.name = scheme.name.clone();
            converted.location = scheme.location;
        }
        SecuritySchemeType::OAuth2 => {
            let flows = scheme.flows.clone().unwrap_or_default();
            let candidates = [
                (SwaggerOAuthFlow::Implicit, flows.implicit),
                (SwaggerOAuthFlow::Password, flows.password),
                (SwaggerOAuthFlow::Application, flows.client_credentials),
                (SwaggerOAuthFlow::AccessCode, flows.authorization_code),
            ];
            let mut present = candidates
                .into_iter()
                .filter_map(|(kind, flow)| flow.map(|flow| (kind, flow)));
            let Some((kind, flow)) = present.next() else {
                return Err(ConvertError::step(
                    STEP,
                    format!("security scheme {name:?}: oauth2 without flows"),
                ));
            };
            let dropped = present.count();
            if dropped > 0 {
                log::warn!("security scheme {name:?}: keeping one oauth2 flow, dropping {dropped}");
            }
            let OAuthFlow {
                authorization_url,
                token_url,
                scopes,
                ..
            } = flow;
            converted.scheme_type = SwaggerSecurityType::OAuth2;
            converted.flow = Some(kind);
            converted.authorization_url = authorization_url;
            converted.token_url = token_url;
            converted.scopes = scopes;
        }
        SecuritySchemeType::OpenIdConnect | SecuritySchemeType::MutualTls => {
            return Err(ConvertError::step(
                STEP,
                format!("security scheme {name:?} has a type Swagger 2.0 cannot express"),
            ));
        }
    }

    Ok(converted)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn openapi(value: serde_json::Value) -> OpenApiSpec {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_servers_to_host_and_schemes() {
        let mut spec = openapi(json!({
            "openapi": "3.0.4",
            "info": {"title": "t", "version": "1"},
            "servers": [
                {"url": "https://{region}.example.com/v1/", "variables": {"region": {"default": "eu"}}},
                {"url": "http://eu.example.com/v1"}
            ],
            "paths": {}
        }));
        let swagger = downgrade(&mut spec).unwrap();
        assert_eq!(swagger.host.as_deref(), Some("eu.example.com"));
        assert_eq!(swagger.base_path.as_deref(), Some("/v1"));
        assert_eq!(swagger.schemes, vec!["https", "http"]);
    }

    #[test]
    fn test_parameter_flattening() {
        let spec = openapi(json!({
            "openapi": "3.0.4",
            "info": {"title": "t", "version": "1"},
            "paths": {},
            "components": {
                "schemas": {"Limit": {"type": "integer", "maximum": 100}}
            }
        }));
        let resolver = SchemaResolver {
            schemas: &spec.components.as_ref().unwrap().schemas,
        };

        let parameter: Parameter = serde_json::from_value(json!({
            "name": "limit",
            "in": "query",
            "schema": {"$ref": "#/components/schemas/Limit"}
        }))
        .unwrap();
        let converted = convert_parameter(&parameter, &resolver).unwrap();
        assert_eq!(converted.param_type, Some(SchemaType::Integer));
        assert_eq!(converted.maximum, Some(100.into()));

        let parameter: Parameter = serde_json::from_value(json!({
            "name": "ids",
            "in": "query",
            "style": "form",
            "explode": false,
            "schema": {"type": "array", "items": {"type": "string"}}
        }))
        .unwrap();
        let converted = convert_parameter(&parameter, &resolver).unwrap();
        assert_eq!(converted.collection_format.as_deref(), Some("csv"));

        let parameter: Parameter = serde_json::from_value(json!({
            "name": "session",
            "in": "cookie",
            "schema": {"type": "string"}
        }))
        .unwrap();
        assert!(convert_parameter(&parameter, &resolver).is_none());
    }

    #[test]
    fn test_security_schemes() {
        let basic: SecurityScheme =
            serde_json::from_value(json!({"type": "http", "scheme": "basic"})).unwrap();
        assert_eq!(
            convert_security_scheme("basic", &basic).unwrap().scheme_type,
            SwaggerSecurityType::Basic
        );

        let bearer: SecurityScheme =
            serde_json::from_value(json!({"type": "http", "scheme": "bearer"})).unwrap();
        let converted = convert_security_scheme("bearer", &bearer).unwrap();
        assert_eq!(converted.scheme_type, SwaggerSecurityType::ApiKey);
        assert_eq!(converted.name.as_deref(), Some("Authorization"));

        let oidc: SecurityScheme = serde_json::from_value(json!({
            "type": "openIdConnect",
            "openIdConnectUrl": "https://auth.example.com/.well-known/openid-configuration"
        }))
        .unwrap();
        let err = convert_security_scheme("oidc", &oidc).unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @r#"OpenAPI 3.0 to Swagger 2.0 conversion failed: security scheme "oidc" has a type Swagger 2.0 cannot express"#
        );
    }

    #[test]
    fn test_request_body_reference_becomes_parameter_reference() {
        let mut spec = openapi(json!({
            "openapi": "3.0.4",
            "info": {"title": "t", "version": "1"},
            "paths": {
                "/pets": {
                    "post": {
                        "requestBody": {"$ref": "#/components/requestBodies/NewPet"},
                        "responses": {
                            "201": {
                                "description": "created",
                                "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {"Pet": {"type": "object"}},
                "requestBodies": {
                    "NewPet": {
                        "required": true,
                        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}
                    }
                }
            }
        }));
        let swagger = downgrade(&mut spec).unwrap();

        let global = &swagger.parameters["NewPet"];
        assert_eq!(global.location, SwaggerParameterLocation::Body);
        assert!(global.required);
        assert_eq!(
            global.schema.as_ref().and_then(SchemaOrRef::ref_path),
            Some("#/definitions/Pet")
        );

        let post = swagger.paths["/pets"].post.as_ref().unwrap();
        assert!(matches!(
            post.parameters.as_slice(),
            [SwaggerParameterOrRef::Ref { ref_path }] if ref_path == "#/parameters/NewPet"
        ));
        assert_eq!(post.produces, vec!["application/json"]);
        let Some(SwaggerResponseOrRef::Response(created)) = post.responses.get("201") else {
            panic!("expected inline response");
        };
        assert_eq!(
            created.schema.as_ref().and_then(SchemaOrRef::ref_path),
            Some("#/definitions/Pet")
        );
    }
}
