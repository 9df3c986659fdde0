use thiserror::Error;

/// Failures that are anticipated for a single source and recovered at the
/// per-source boundary. None of these abort a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("upstream responded with HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("format error: {0}")]
    Format(String),

    #[error("schema error: {0}")]
    Schema(String),
}

impl SourceError {
    /// Short label used in logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::Network(_) | SourceError::HttpStatus { .. } => "network",
            SourceError::Format(_) => "format",
            SourceError::Schema(_) => "schema",
        }
    }
}

/// Failures that escape per-source isolation and terminate the whole run.
#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("invalid source registry: {0}")]
    InvalidRegistry(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, IntegrationError>;
