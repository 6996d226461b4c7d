//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! Every variant maps onto an [`ErrorKind`] so callers can tell transport
//! failures from rejected credentials, exhausted quotas, and bad payloads.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Quota or rate limit exceeded: {0}")]
    Quota(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

/// Coarse failure category, stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Authentication,
    Quota,
    Api,
    MalformedResponse,
    Filesystem,
    Config,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(_) => ErrorKind::Transport,
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::Quota(_) => ErrorKind::Quota,
            Error::Api { .. } => ErrorKind::Api,
            Error::MalformedResponse(_) | Error::Serialization(_) => ErrorKind::MalformedResponse,
            Error::Image(image::ImageError::IoError(_)) => ErrorKind::Filesystem,
            Error::Image(_) => ErrorKind::MalformedResponse,
            Error::Filesystem(_) => ErrorKind::Filesystem,
            Error::Config(_) => ErrorKind::Config,
            Error::Invariant(_) => ErrorKind::Internal,
        }
    }

    /// Classify a non-success HTTP status returned by a remote endpoint.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => Error::Authentication(format!("status {}: {}", status, body)),
            402 | 429 => Error::Quota(format!("status {}: {}", status, body)),
            code => Error::Api {
                status: code,
                message: body,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
