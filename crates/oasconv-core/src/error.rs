use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot parse Swagger or OpenAPI document: no `openapi` or `swagger` version field")]
    MissingVersion,

    #[error("unsupported document version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("errors loading document: {}", join_errors(.0))]
    Load(Vec<ResolveError>),

    #[error("{step} conversion failed: {message}")]
    Step { step: &'static str, message: String },

    #[error("failed to render document: {0}")]
    Render(#[source] serde_json::Error),

    #[error("failed to convert output format: {0}")]
    Format(String),
}

impl ConvertError {
    pub(crate) fn step(step: &'static str, message: impl Into<String>) -> Self {
        Self::Step {
            step,
            message: message.into(),
        }
    }

    /// True when the failure comes from an unrecognised version string.
    pub fn is_unsupported_version(&self) -> bool {
        matches!(self, Self::Parse(ParseError::UnsupportedVersion(_)))
    }
}

fn join_errors(errors: &[ResolveError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
