use pocket::errors::{ErrorKind, PocketError};
use thiserror::Error;

/// Failures raised inside the fjall substrate before they reach Pocket.
#[derive(Debug, Error)]
pub enum FjallSubstrateError {
    /// The keyspace or its partition could not be opened
    #[error("Failed to open fjall keyspace at '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: fjall::Error,
    },
    /// A read or write against the partition failed
    #[error("Fjall operation failed: {0}")]
    Backend(#[from] fjall::Error),
    /// A stored key or value is not UTF-8 text
    #[error("Invalid UTF-8 in stored data: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    /// The substrate was used after it was closed
    #[error("Fjall substrate is closed")]
    Closed,
}

impl From<FjallSubstrateError> for PocketError {
    fn from(err: FjallSubstrateError) -> Self {
        let kind = match &err {
            FjallSubstrateError::Open { .. } | FjallSubstrateError::Closed => {
                ErrorKind::SubstrateUnavailable
            }
            FjallSubstrateError::Backend(_) => ErrorKind::BackendError,
            FjallSubstrateError::InvalidUtf8(_) => ErrorKind::EncodingError,
        };
        log::error!("{}", err);
        PocketError::new(&err.to_string(), kind)
    }
}
