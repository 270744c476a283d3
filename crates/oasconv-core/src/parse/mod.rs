pub mod components;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod ref_resolve;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod server;
pub mod spec;
pub mod swagger;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ConvertError, ParseError};
use crate::format::TextFormat;
use spec::OpenApiSpec;

/// Parse an OpenAPI 3.x document from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_yaml_ng::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI 3.x document from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_json::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Deserialize JSON first, then YAML. When both fail, the error reported is
/// the one for the format the input looks like.
pub fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T, ParseError> {
    let json_err = match serde_json::from_slice(input) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };
    match serde_yaml_ng::from_slice(input) {
        Ok(value) => Ok(value),
        Err(yaml_err) => match TextFormat::detect(input) {
            TextFormat::Json => Err(ParseError::Json(json_err)),
            TextFormat::Yaml => Err(ParseError::Yaml(yaml_err)),
        },
    }
}

/// Load a document for a conversion step: parse it and check that every
/// local reference resolves. Failures are reported against `step`.
pub fn load<T: DeserializeOwned + Serialize>(
    input: &[u8],
    step: &'static str,
) -> Result<T, ConvertError> {
    let document: T = from_slice(input)
        .map_err(|e| ConvertError::step(step, format!("error loading document: {e}")))?;
    ref_resolve::check_local_refs(&document).map_err(ConvertError::Load)?;
    Ok(document)
}

/// Render a document as pretty-printed JSON.
pub fn render<T: Serialize>(document: &T) -> Result<Vec<u8>, ConvertError> {
    serde_json::to_vec_pretty(document).map_err(ConvertError::Render)
}

fn validate_version(spec: &OpenApiSpec) -> Result<(), ParseError> {
    if !spec.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(spec.openapi.clone()));
    }
    Ok(())
}
