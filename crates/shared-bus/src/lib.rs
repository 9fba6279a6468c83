//! # Shared Bus - Connectivity Bus
//!
//! Carries the reduced connectivity status from the status reducer to any
//! number of subscribers.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │Status Reducer│                    │  Subscriber  │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │ Connectivity │          │
//!                  │     Bus      │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Delivery
//!
//! - Every subscriber owns a bounded channel; a publish waits at most the
//!   publish timeout for each subscriber to accept the update.
//! - A subscriber that cannot accept in time fails the publish. Callers treat
//!   that as fatal; updates are never silently dropped.
//! - Only the latest status is retained. Late subscribers see no replay.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

use std::time::Duration;

// Re-export main types
pub use events::{StatusFilter, StatusUpdate};
pub use publisher::{ConnectivityBus, PublishError, StatusPublisher};
pub use subscriber::{StatusStream, StatusSubscription, SubscriptionError};

/// Updates buffered per subscriber before a publish has to wait.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 16;

/// How long a publish waits for each subscriber.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(1);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_publish_timeout() {
        assert_eq!(DEFAULT_PUBLISH_TIMEOUT, Duration::from_secs(1));
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_SUBSCRIBER_CAPACITY, 16);
    }
}
