//! Error types for the Synthetics API client.

use thiserror::Error;

/// Base error type for Synthetics operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status code of the failed call, if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Auth(e) => Some(e.status_code),
            Error::Api(e) => e.status_code,
            _ => None,
        }
    }
}

/// Raised when the API rejects the API key (401 or 403).
#[derive(Error, Debug)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
    pub status_code: u16,
}

/// Raised when the API returns an error response.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status_code: Option<u16>,
    pub response_data: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(
        message: impl Into<String>,
        status_code: Option<u16>,
        response_data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            message: message.into(),
            status_code,
            response_data,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Decode(e.to_string())
        } else {
            Error::Transport(e.to_string())
        }
    }
}
