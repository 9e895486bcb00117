//! Error types for talking to the backend.

use store::StoreError;
use thiserror::Error;

/// The request never produced an HTTP response.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Network(e.to_string())
    }
}

/// Failure of an identity operation.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The server answered with an error; the message is the server's own.
    #[error("{0}")]
    Rejected(String),

    #[error("Cannot reach the server")]
    Unreachable,

    #[error("Session expired, please log in again")]
    Unauthorized,

    #[error("Unexpected response: {0}")]
    Malformed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}
