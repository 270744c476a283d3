use crate::parse::media_type::OCTET_STREAM;
use crate::parse::operation::HttpMethod;
use crate::parse::schema::{Schema, SchemaOrRef};
use crate::parse::swagger::{SwaggerParameterLocation, SwaggerParameterOrRef, SwaggerSpec};

/// Give schema-less body parameters a binary string schema on operations
/// that consume `application/octet-stream`. An operation without its own
/// `consumes` inherits the document's. Returns the number of parameters
/// changed.
pub fn fix_upload_formats(swagger: &mut SwaggerSpec) -> usize {
    let document_consumes = &swagger.consumes;
    let mut changed = 0;

    for path_item in swagger.paths.values_mut() {
        for method in HttpMethod::ALL {
            let Some(operation) = path_item.operation_mut(method) else {
                continue;
            };
            let consumes = if operation.consumes.is_empty() {
                document_consumes
            } else {
                &operation.consumes
            };
            if !consumes.iter().any(|media_type| media_type == OCTET_STREAM) {
                continue;
            }

            for parameter in operation.parameters.iter_mut() {
                if let SwaggerParameterOrRef::Parameter(parameter) = parameter {
                    if parameter.location == SwaggerParameterLocation::Body
                        && parameter.schema.is_none()
                    {
                        parameter.schema = Some(SchemaOrRef::inline(Schema::binary_string()));
                        changed += 1;
                    }
                }
            }
        }
    }

    log::debug!("assigned binary schemas to {changed} upload body parameters");
    changed
}
