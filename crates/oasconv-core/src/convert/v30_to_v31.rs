//! OpenAPI 3.0 → OpenAPI 3.1.

use crate::error::ConvertError;
use crate::fixup;
use crate::parse;
use crate::parse::spec::OpenApiSpec;
use crate::transform::{self, rules};
use crate::version::SpecVersion;

pub const STEP: &str = "OpenAPI 3.0 to OpenAPI 3.1";

pub fn convert(data: &[u8]) -> Result<Vec<u8>, ConvertError> {
    let mut spec: OpenApiSpec = parse::load(data, STEP)?;
    upgrade(&mut spec);
    parse::render(&spec)
}

/// Upgrade a parsed 3.0 document in place.
pub fn upgrade(spec: &mut OpenApiSpec) {
    fixup::set_version(spec, SpecVersion::OpenApi31);
    fixup::clear_octet_stream_schemas(spec);
    transform::apply_to_document(spec, rules::UPGRADE_30_TO_31);
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn test_upgrade_document() {
        let input = json!({
            "openapi": "3.0.3",
            "info": {"title": "t", "version": "1"},
            "paths": {
                "/files": {
                    "put": {
                        "requestBody": {
                            "content": {
                                "application/octet-stream": {
                                    "schema": {"type": "string", "format": "binary"}
                                }
                            }
                        },
                        "responses": {"204": {"description": "stored"}}
                    }
                }
            },
            "components": {
                "schemas": {
                    "Pet": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string", "nullable": true, "example": "Rex"},
                            "age": {"type": "integer", "minimum": 0, "exclusiveMinimum": true}
                        }
                    }
                }
            }
        });

        let output = convert(&serde_json::to_vec(&input).unwrap()).unwrap();
        let output: Value = serde_json::from_slice(&output).unwrap();

        assert_eq!(output["openapi"], "3.1.1");
        assert_eq!(
            output["paths"]["/files"]["put"]["requestBody"]["content"]["application/octet-stream"],
            json!({})
        );
        assert_eq!(
            output["components"]["schemas"]["Pet"]["properties"],
            json!({
                "name": {"type": ["string", "null"], "examples": ["Rex"]},
                "age": {"type": "integer", "exclusiveMinimum": 0}
            })
        );
    }
}
