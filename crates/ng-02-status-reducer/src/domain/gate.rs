//! One-shot bootstrap gate.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Semaphore;
use tracing::debug;

/// Single-permit gate, signalled at most once and awaited once.
///
/// Backed by a semaphore that starts with no permits. The first `signal`
/// adds the only permit; later signals are no-ops.
#[derive(Debug)]
pub struct Gate {
    permits: Semaphore,
    signalled: AtomicBool,
    signal_attempts: AtomicU64,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            permits: Semaphore::new(0),
            signalled: AtomicBool::new(false),
            signal_attempts: AtomicU64::new(0),
        }
    }

    /// Open the gate.
    ///
    /// Returns `true` only for the call that actually opened it.
    pub fn signal(&self) -> bool {
        self.signal_attempts.fetch_add(1, Ordering::Relaxed);
        if self
            .signalled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.permits.add_permits(1);
            debug!("[ng-02] Gate signalled");
            true
        } else {
            false
        }
    }

    /// Wait, without timeout, until the gate is signalled.
    ///
    /// Consumes the permit.
    pub async fn wait(&self) {
        // The semaphore is never closed, so acquire cannot fail.
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }

    #[must_use]
    pub fn is_signalled(&self) -> bool {
        self.signalled.load(Ordering::Acquire)
    }

    /// Permits currently available; never more than one.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// How many times `signal` was called, effective or not.
    #[must_use]
    pub fn signal_attempts(&self) -> u64 {
        self.signal_attempts.load(Ordering::Relaxed)
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}
