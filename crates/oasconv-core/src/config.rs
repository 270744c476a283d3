use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::format::TextFormat;
use crate::version::SpecVersion;

/// Project configuration loaded from `.oasconv.yaml`. Command-line flags
/// take precedence over every field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Dialect to convert to.
    pub target: SpecVersion,
    /// Text format of the written document.
    pub format: TextFormat,
    /// Output path; standard output when absent.
    pub output: Option<String>,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oasconv.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ConvertConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: ConvertConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oasconv configuration
target: "3.1"     # swagger | "3.0" | "3.1" (quote the numbers)
format: json      # json | yaml
# output: openapi.json   # write here instead of stdout
"#
}
