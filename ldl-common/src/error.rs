//! Error types for the Long Distance Love backend.

use thiserror::Error;

/// Result type alias using the service error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the backend.
///
/// Every variant maps to an HTTP status via [`Error::status_code`]. Handlers
/// log the full error server-side and only ever return a generic message to
/// the client.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input or request (e.g. missing upload field)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The uploaded document could not be parsed
    #[error("Document parse error: {0}")]
    DocumentParse(String),

    /// The completion API call failed (network, API error, malformed response)
    #[error("Upstream generation error: {0}")]
    UpstreamGeneration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Check if this is a document parse failure.
    pub const fn is_document_parse(&self) -> bool {
        matches!(self, Self::DocumentParse(_))
    }

    /// Check if this is an upstream generation failure.
    pub const fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamGeneration(_))
    }

    /// Get the HTTP status code for this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            _ => 500,
        }
    }
}
