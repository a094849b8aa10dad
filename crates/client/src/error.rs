//! Typed error type for the client crate.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid OneTap base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("OneTap API returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("invalid JSON in OneTap response: {0}")]
    Decode(#[from] serde_json::Error),
}
