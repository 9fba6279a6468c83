//! # Fatal Signal
//!
//! The single place fatal conditions end up. The first error raised is
//! kept; later ones are logged and counted but do not replace it.

use netgate_telemetry::record_fatal;
use shared_types::{FatalError, FatalErrorSink};
use tokio::sync::watch;
use tracing::error;

pub struct FatalSignal {
    sender: watch::Sender<Option<FatalError>>,
}

impl FatalSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// The first fatal error raised, if any.
    pub fn raised(&self) -> Option<FatalError> {
        self.sender.borrow().clone()
    }

    /// Wait until a fatal error is raised.
    pub async fn wait(&self) -> FatalError {
        let mut receiver = self.sender.subscribe();
        loop {
            if let Some(err) = receiver.borrow_and_update().clone() {
                return err;
            }
            // The sender lives in `self`, so the channel cannot close here.
            if receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for FatalSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl FatalErrorSink for FatalSignal {
    fn raise(&self, err: FatalError) {
        error!(kind = err.kind(), error = %err, "[runtime] FATAL");
        record_fatal(&err);
        self.sender.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(err);
                true
            } else {
                false
            }
        });
    }
}
