use crate::parse::spec::OpenApiSpec;
use crate::version::SpecVersion;

/// Remove the top-level fields 3.0 does not have: `jsonSchemaDialect`,
/// `webhooks`, `info.summary` and `info.license.identifier`.
pub fn strip_31_fields(spec: &mut OpenApiSpec) {
    let mut stripped = Vec::new();
    if spec.json_schema_dialect.take().is_some() {
        stripped.push("jsonSchemaDialect");
    }
    if spec.webhooks.take().is_some() {
        stripped.push("webhooks");
    }
    if spec.info.summary.take().is_some() {
        stripped.push("info.summary");
    }
    if let Some(license) = spec.info.license.as_mut() {
        if license.extensions.shift_remove("identifier").is_some() {
            stripped.push("info.license.identifier");
        }
    }
    if !stripped.is_empty() {
        log::debug!("stripped 3.1-only fields: {}", stripped.join(", "));
    }
}

/// Declare the document as `version`.
pub fn set_version(spec: &mut OpenApiSpec, version: SpecVersion) {
    spec.openapi = version.document_version().to_string();
}
