use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A server variable for URL templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerVariable {
    pub default: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

/// A server URL definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, ServerVariable>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Server {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: None,
            variables: IndexMap::new(),
            extensions: IndexMap::new(),
        }
    }

    /// The URL with every `{variable}` replaced by its default value.
    pub fn expanded_url(&self) -> String {
        self.variables
            .iter()
            .fold(self.url.clone(), |url, (name, variable)| {
                url.replace(&format!("{{{name}}}"), &variable.default)
            })
    }
}

/// The parts of an absolute or relative server URL that Swagger 2.0 keeps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlParts {
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub base_path: Option<String>,
}

/// Split `scheme://host/base/path` into its Swagger fields. A URL without a
/// scheme is treated as a path relative to the document host.
pub fn split_url(url: &str) -> UrlParts {
    let (scheme, rest) = match url.split_once("://") {
        Some((scheme, rest)) => (Some(scheme.to_string()), Some(rest)),
        None => (None, None),
    };

    match rest {
        Some(rest) => {
            let (host, path) = match rest.find('/') {
                Some(idx) => (&rest[..idx], &rest[idx..]),
                None => (rest, ""),
            };
            UrlParts {
                scheme,
                host: (!host.is_empty()).then(|| host.to_string()),
                base_path: non_root_path(path),
            }
        }
        None => UrlParts {
            scheme: None,
            host: None,
            base_path: non_root_path(url),
        },
    }
}

fn non_root_path(path: &str) -> Option<String> {
    let trimmed = path.trim_end_matches('/');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
