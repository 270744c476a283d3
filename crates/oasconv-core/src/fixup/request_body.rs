//! Inline request bodies across the 3.0 → Swagger step.
//!
//! Request-body content is detached from the 3.0 document before the base
//! conversion and reattached to the Swagger operations afterwards. Only the
//! `application/json` entry comes back, as a `body` parameter; other media
//! types survive only in the operation's `consumes` list.

use indexmap::IndexMap;

use crate::parse::media_type::{APPLICATION_JSON, Content};
use crate::parse::operation::HttpMethod;
use crate::parse::request_body::RequestBodyOrRef;
use crate::parse::spec::OpenApiSpec;
use crate::parse::swagger::{
    SwaggerParameter, SwaggerParameterLocation, SwaggerParameterOrRef, SwaggerSpec,
};
use crate::transform::swagger_schema;

/// Identifies an operation by path template and verb.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BodyContentLocation {
    pub path: String,
    pub method: HttpMethod,
}

/// Detached request-body content, in document order.
pub type BodyContents = IndexMap<BodyContentLocation, Content>;

/// Take the content of every non-empty inline request body out of the
/// document. The emptied request bodies stay in place.
pub fn extract_request_body_content(spec: &mut OpenApiSpec) -> BodyContents {
    let mut contents = BodyContents::new();
    for (path, path_item) in spec.paths.iter_mut() {
        for method in HttpMethod::ALL {
            let Some(operation) = path_item.operation_mut(method) else {
                continue;
            };
            let Some(RequestBodyOrRef::RequestBody(body)) = operation.request_body.as_mut() else {
                continue;
            };
            if body.content.is_empty() {
                continue;
            }
            let location = BodyContentLocation {
                path: path.clone(),
                method,
            };
            contents.insert(location, std::mem::take(&mut body.content));
        }
    }
    log::debug!("detached {} request bodies", contents.len());
    contents
}

/// Reattach detached content to the converted Swagger operations. Returns
/// the number of body parameters added.
pub fn insert_body_parameters(swagger: &mut SwaggerSpec, contents: BodyContents) -> usize {
    let mut inserted = 0;
    for (location, mut content) in contents {
        let Some(operation) = swagger
            .paths
            .get_mut(&location.path)
            .and_then(|item| item.operation_mut(location.method))
        else {
            continue;
        };

        for media_type in content.keys() {
            if !operation.consumes.contains(media_type) {
                operation.consumes.push(media_type.clone());
            }
        }

        let Some(json) = content.shift_remove(APPLICATION_JSON) else {
            log::warn!(
                "{} {}: request body has no {APPLICATION_JSON} content; its schema is dropped",
                location.method,
                location.path
            );
            continue;
        };
        if !content.is_empty() {
            log::warn!(
                "{} {}: dropping schemas of {} non-JSON request body media types",
                location.method,
                location.path,
                content.len()
            );
        }

        let mut parameter = SwaggerParameter::new("body", SwaggerParameterLocation::Body);
        parameter.required = true;
        parameter.schema = json.schema.map(|mut schema| {
            swagger_schema::to_swagger(&mut schema);
            schema
        });
        parameter.extensions = json.extensions;
        operation
            .parameters
            .push(SwaggerParameterOrRef::Parameter(parameter));
        inserted += 1;
    }
    log::debug!("inserted {inserted} body parameters");
    inserted
}
