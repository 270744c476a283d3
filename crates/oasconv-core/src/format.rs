//! Text-format detection and JSON ↔ YAML re-encoding of whole documents.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConvertError;

/// Serialized text format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    #[default]
    Json,
    Yaml,
}

impl TextFormat {
    /// Inspect the first non-whitespace byte: `{` means JSON, anything else
    /// (including an empty document) means YAML.
    pub fn detect(data: &[u8]) -> TextFormat {
        match data
            .iter()
            .copied()
            .find(|b| !matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
        {
            Some(b'{') => TextFormat::Json,
            _ => TextFormat::Yaml,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextFormat::Json => "json",
            TextFormat::Yaml => "yaml",
        }
    }
}

impl std::str::FromStr for TextFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(TextFormat::Json),
            "yaml" | "yml" => Ok(TextFormat::Yaml),
            other => Err(format!("invalid format: {other}")),
        }
    }
}

/// Re-encode `data` into `target` if it is not already in that format.
pub fn reencode(data: Vec<u8>, target: TextFormat) -> Result<Vec<u8>, ConvertError> {
    if TextFormat::detect(&data) == target {
        return Ok(data);
    }

    match target {
        TextFormat::Json => {
            let value: Value = serde_yaml_ng::from_slice(&data)
                .map_err(|e| ConvertError::Format(e.to_string()))?;
            serde_json::to_vec_pretty(&value).map_err(|e| ConvertError::Format(e.to_string()))
        }
        TextFormat::Yaml => {
            let value: Value =
                serde_json::from_slice(&data).map_err(|e| ConvertError::Format(e.to_string()))?;
            serde_yaml_ng::to_string(&value)
                .map(String::into_bytes)
                .map_err(|e| ConvertError::Format(e.to_string()))
        }
    }
}
