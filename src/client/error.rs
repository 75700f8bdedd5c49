use std::time::Duration;

use hyper::StatusCode;

/// Failure of a single request to the panel.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid request for `{path}`: {source}")]
    Request {
        path: String,
        #[source]
        source: hyper::http::Error,
    },
    #[error("failed to send request to `{path}`: {source}")]
    Send {
        path: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },
    #[error("failed to read response body of `{path}`: {source}")]
    Body {
        path: String,
        #[source]
        source: hyper::Error,
    },
    #[error("request to `{path}` timed out after {timeout:?}")]
    Timeout { path: String, timeout: Duration },
    #[error("request to `{path}` failed with status {status}")]
    Status { path: String, status: StatusCode },
}

impl TransportError {
    /// Whether the panel refused the credential attached to the request.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            TransportError::Status {
                status: StatusCode::UNAUTHORIZED,
                ..
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
