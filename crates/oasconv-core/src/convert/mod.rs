//! The conversion pipeline: detect the input dialect, then step one dialect
//! at a time toward the target.
//!
//! Every step parses the bytes the previous step rendered, so each one sees
//! a document that is valid for its own source dialect.

pub mod swagger_to_v30;
pub mod v30_to_swagger;
pub mod v30_to_v31;
pub mod v31_to_v30;

use crate::error::ConvertError;
use crate::version::{self, SpecVersion};

/// Convert `data` (JSON or YAML) to `target`. The result is pretty-printed
/// JSON, except when no step is needed: then the input is returned as is.
pub fn convert(data: &[u8], target: SpecVersion) -> Result<Vec<u8>, ConvertError> {
    let mut current = version::detect(data)?;
    if current == target {
        log::info!("document is already {target}; nothing to convert");
        return Ok(data.to_vec());
    }

    let mut document = data.to_vec();
    while let Some(next) = current.step_toward(target) {
        log::info!("converting {current} to {next}");
        document = convert_step(&document, current, next)?;
        current = next;
    }
    Ok(document)
}

/// Run the single step from `from` to the adjacent dialect `to`.
pub fn convert_step(
    data: &[u8],
    from: SpecVersion,
    to: SpecVersion,
) -> Result<Vec<u8>, ConvertError> {
    match (from, to) {
        (SpecVersion::Swagger, SpecVersion::OpenApi30) => swagger_to_v30::convert(data),
        (SpecVersion::OpenApi30, SpecVersion::OpenApi31) => v30_to_v31::convert(data),
        (SpecVersion::OpenApi31, SpecVersion::OpenApi30) => v31_to_v30::convert(data),
        (SpecVersion::OpenApi30, SpecVersion::Swagger) => v30_to_swagger::convert(data),
        (from, to) => Err(ConvertError::step(
            "pipeline",
            format!("no single step converts {from} to {to}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_returns_input() {
        let input = b"openapi: 3.1.0\ninfo: {title: t, version: '1'}\npaths: {}\n";
        assert_eq!(convert(input, SpecVersion::OpenApi31).unwrap(), input.to_vec());
    }

    #[test]
    fn test_non_adjacent_step_is_rejected() {
        let err = convert_step(b"{}", SpecVersion::Swagger, SpecVersion::OpenApi31).unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"pipeline conversion failed: no single step converts Swagger 2.0 to OpenAPI 3.1"
        );
    }
}
