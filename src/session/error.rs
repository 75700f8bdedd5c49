use hyper::StatusCode;

use crate::client::TransportError;

/// Failure to obtain a credential from the panel.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("login request failed: {0}")]
    Transport(#[from] TransportError),
    #[error("login rejected with status {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("login rejected by panel: {0}")]
    Rejected(String),
    #[error("failed to encode login form: {0}")]
    Encode(String),
    #[error("failed to decode login response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("login response carried no `{0}` credential")]
    MissingCredential(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
