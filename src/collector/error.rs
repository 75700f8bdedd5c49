use crate::client::TransportError;

use super::CollectionTarget;

/// Unexpected shape of an upstream response.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("panel reported failure: {0}")]
    Unsuccessful(String),
    #[error("response carries no payload")]
    MissingPayload,
}

/// Failure of one collector run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to decode {target} response: {source}")]
    Decode {
        target: CollectionTarget,
        #[source]
        source: DecodeError,
    },
}

impl Error {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Transport(err) if err.is_unauthorized())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
