//! Error types for the status reducer

use shared_bus::PublishError;
use shared_types::FatalError;
use thiserror::Error;

/// Errors from applying a reduction. All of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReducerError {
    #[error("Publishing connectivity status failed: {0}")]
    Publish(#[from] PublishError),
}

impl From<ReducerError> for FatalError {
    fn from(err: ReducerError) -> Self {
        match err {
            ReducerError::Publish(e) => FatalError::PublishFailed(e.to_string()),
        }
    }
}
