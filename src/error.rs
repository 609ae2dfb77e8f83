use thiserror::Error;

/// Unified error type for release-plan operations
#[derive(Error, Debug)]
pub enum ReleasePlanError {
    #[error("Version format error: {0}")]
    Format(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lookup unavailable: {0}")]
    Lookup(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in release-plan
pub type Result<T> = std::result::Result<T, ReleasePlanError>;

impl ReleasePlanError {
    /// Create a version format error naming the offending input
    pub fn format(msg: impl Into<String>) -> Self {
        ReleasePlanError::Format(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleasePlanError::Config(msg.into())
    }

    /// Create a lookup error for a collaborator that could not be set up
    pub fn lookup(msg: impl Into<String>) -> Self {
        ReleasePlanError::Lookup(msg.into())
    }

    /// True for errors that should fail the pipeline immediately.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ReleasePlanError::Config(_) | ReleasePlanError::ConfigParse(_)
        )
    }
}
