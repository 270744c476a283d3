//! Dialect classification from a document's version-declaring field.

use serde::Deserialize;

use crate::error::ParseError;
use crate::parse;

/// The three supported dialects, ordered oldest to newest. Conversion steps
/// move one ordinal position at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
pub enum SpecVersion {
    #[serde(rename = "swagger", alias = "2.0")]
    Swagger,
    #[serde(rename = "3.0")]
    OpenApi30,
    #[default]
    #[serde(rename = "3.1")]
    OpenApi31,
}

impl SpecVersion {
    /// The version string written into documents of this dialect.
    pub fn document_version(&self) -> &'static str {
        match self {
            SpecVersion::Swagger => "2.0",
            SpecVersion::OpenApi30 => "3.0.4",
            SpecVersion::OpenApi31 => "3.1.1",
        }
    }

    /// Classify a declared version string.
    pub fn from_document_version(version: &str) -> Result<SpecVersion, ParseError> {
        match version {
            "2.0" => Ok(SpecVersion::Swagger),
            "3.0.0" | "3.0.1" | "3.0.2" | "3.0.3" | "3.0.4" => Ok(SpecVersion::OpenApi30),
            "3.1.0" | "3.1.1" => Ok(SpecVersion::OpenApi31),
            other => Err(ParseError::UnsupportedVersion(other.to_string())),
        }
    }

    /// The dialect one step closer to `target`, or `None` when already there.
    pub fn step_toward(&self, target: SpecVersion) -> Option<SpecVersion> {
        use std::cmp::Ordering;

        match (self.cmp(&target), self) {
            (Ordering::Equal, _) => None,
            (Ordering::Less, SpecVersion::Swagger) => Some(SpecVersion::OpenApi30),
            (Ordering::Less, _) => Some(SpecVersion::OpenApi31),
            (Ordering::Greater, SpecVersion::OpenApi31) => Some(SpecVersion::OpenApi30),
            (Ordering::Greater, _) => Some(SpecVersion::Swagger),
        }
    }
}

impl std::fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecVersion::Swagger => f.write_str("Swagger 2.0"),
            SpecVersion::OpenApi30 => f.write_str("OpenAPI 3.0"),
            SpecVersion::OpenApi31 => f.write_str("OpenAPI 3.1"),
        }
    }
}

impl std::str::FromStr for SpecVersion {
    type Err = String;

    /// Parse a target name as accepted on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "swagger" | "2.0" => Ok(SpecVersion::Swagger),
            "3.0" => Ok(SpecVersion::OpenApi30),
            "3.1" => Ok(SpecVersion::OpenApi31),
            other => Err(format!("invalid version: {other}")),
        }
    }
}

/// Only the envelope fields that declare a version.
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default, deserialize_with = "version_string")]
    openapi: Option<String>,
    #[serde(default, deserialize_with = "version_string")]
    swagger: Option<String>,
}

/// Accept `swagger: 2.0` written as an unquoted YAML number as well as a string.
fn version_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Detect the dialect of a raw document. Only `openapi` and `swagger` are
/// read; `openapi` wins when both are present and non-empty. Input that is
/// neither JSON nor YAML reports the underlying parse error.
pub fn detect(data: &[u8]) -> Result<SpecVersion, ParseError> {
    let envelope: Envelope = parse::from_slice(data)?;

    let version = envelope
        .openapi
        .filter(|v| !v.is_empty())
        .or(envelope.swagger)
        .filter(|v| !v.is_empty())
        .ok_or(ParseError::MissingVersion)?;

    let detected = SpecVersion::from_document_version(&version)?;
    log::debug!("detected {detected} from version string {version:?}");
    Ok(detected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_toward_moves_one_ordinal() {
        use SpecVersion::*;
        assert_eq!(Swagger.step_toward(OpenApi31), Some(OpenApi30));
        assert_eq!(OpenApi30.step_toward(OpenApi31), Some(OpenApi31));
        assert_eq!(OpenApi31.step_toward(Swagger), Some(OpenApi30));
        assert_eq!(OpenApi30.step_toward(Swagger), Some(Swagger));
        assert_eq!(OpenApi30.step_toward(OpenApi30), None);
    }

    #[test]
    fn test_parse_target_names() {
        assert_eq!("Swagger".parse::<SpecVersion>().unwrap(), SpecVersion::Swagger);
        assert_eq!("3.0".parse::<SpecVersion>().unwrap(), SpecVersion::OpenApi30);
        assert!("3.2".parse::<SpecVersion>().is_err());
    }
}
