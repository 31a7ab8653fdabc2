use thiserror::Error;

/// Status code the registry service returns when a query matched no data.
pub const STATUS_NO_DATA: &str = "013";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DartError {
    #[error("Parse error: {0}")]
    Parse(String),

    /// The upstream service answered, but with a non-success status.
    /// `message` is kept verbatim.
    #[error("Source error [{status}]: {message}")]
    Source { status: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DartError {
    pub fn source_error(status: impl Into<String>, message: impl Into<String>) -> Self {
        DartError::Source {
            status: status.into(),
            message: message.into(),
        }
    }

    /// Expected "nothing there" outcomes, which callers should not report as failures.
    pub fn is_not_found(&self) -> bool {
        match self {
            DartError::NotFound(_) => true,
            DartError::Source { status, .. } => status == STATUS_NO_DATA,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for DartError {
    fn from(err: serde_json::Error) -> Self {
        DartError::Serialization(err.to_string())
    }
}

pub type DartResult<T> = Result<T, DartError>;
