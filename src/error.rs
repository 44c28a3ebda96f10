// Error types for the ampere library.
// Covers GitHub API errors, cache serialization errors, selection decoding,
// and persisted-state IO.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AmpereError {
    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("Missing GITHUB_TOKEN environment variable")]
    MissingToken,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Malformed selection text: {0}")]
    MalformedSelection(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AmpereError>;
