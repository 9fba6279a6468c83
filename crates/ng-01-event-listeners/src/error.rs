//! Error types for the listener registry

use std::time::Duration;
use thiserror::Error;

/// Errors from registration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Event mask selects no categories")]
    EmptyMask,
}

/// Errors from delivering an event to a handler
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("Consumer did not accept event within {0:?}")]
    Timeout(Duration),

    #[error("Consumer channel closed")]
    Closed,
}
