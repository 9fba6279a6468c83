//! Test utilities for downstream crates.
//!
//! Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust
//! use shared_types::test_utils::RecordingFatalSink;
//! use shared_types::{FatalError, FatalErrorSink};
//!
//! let sink = RecordingFatalSink::new();
//! sink.raise(FatalError::MissingInterface);
//! assert_eq!(sink.raised(), vec![FatalError::MissingInterface]);
//! ```

use crate::errors::FatalError;
use crate::ports::FatalErrorSink;
use parking_lot::Mutex;

/// A fatal sink that records every raised error instead of ending anything.
#[derive(Debug, Default)]
pub struct RecordingFatalSink {
    raised: Mutex<Vec<FatalError>>,
}

impl RecordingFatalSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors raised so far, in order.
    pub fn raised(&self) -> Vec<FatalError> {
        self.raised.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.raised.lock().is_empty()
    }
}

impl FatalErrorSink for RecordingFatalSink {
    fn raise(&self, error: FatalError) {
        self.raised.lock().push(error);
    }
}
