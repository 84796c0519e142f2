//! Recording API errors

use thiserror::Error;

/// Errors returned by the recording client
#[derive(Error, Debug)]
pub enum ApiError {
    /// Id is empty or contains URL delimiters
    #[error("Invalid recording id: {0:?}")]
    InvalidId(String),

    /// Backend answered 404
    #[error("Recording not found: {0}")]
    NotFound(String),

    /// Request, status or decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
