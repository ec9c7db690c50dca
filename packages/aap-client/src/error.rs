//! Error types for the AAP client.

use thiserror::Error;

/// Result type for AAP client operations.
pub type Result<T> = std::result::Result<T, AapError>;

/// AAP client errors.
#[derive(Debug, Error)]
pub enum AapError {
    /// Transport failure (connection refused, TLS, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response on a required call
    #[error("AAP API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Base URL or pagination link could not be parsed
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid client settings
    #[error("configuration error: {0}")]
    Config(String),
}
