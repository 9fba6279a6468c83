//! # Status Updates
//!
//! Defines the message that flows through the connectivity bus and the
//! filter subscribers use to select updates by cause.

use serde::{Deserialize, Serialize};
use shared_types::{ConnectivityStatus, EventCategory};

/// A connectivity status transition as published on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Monotonic publish sequence number, starting at 1.
    pub sequence: u64,
    /// The reduced status.
    pub status: ConnectivityStatus,
    /// Category of the raw event that caused this update.
    pub cause: EventCategory,
}

/// Filter for subscribing to specific updates.
#[derive(Debug, Clone, Default)]
pub struct StatusFilter {
    /// Causes to include. Empty means all causes.
    pub causes: Vec<EventCategory>,
}

impl StatusFilter {
    /// Create a filter that accepts all updates.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific causes.
    #[must_use]
    pub fn causes(causes: Vec<EventCategory>) -> Self {
        Self { causes }
    }

    /// Check if an update matches this filter.
    #[must_use]
    pub fn matches(&self, update: &StatusUpdate) -> bool {
        self.causes.is_empty() || self.causes.contains(&update.cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(cause: EventCategory) -> StatusUpdate {
        StatusUpdate {
            sequence: 1,
            status: ConnectivityStatus::Connected,
            cause,
        }
    }

    #[test]
    fn test_filter_all() {
        let filter = StatusFilter::all();
        for cause in EventCategory::ALL {
            assert!(filter.matches(&update(cause)));
        }
    }

    #[test]
    fn test_filter_by_cause() {
        let filter = StatusFilter::causes(vec![EventCategory::Address]);

        assert!(filter.matches(&update(EventCategory::Address)));
        assert!(!filter.matches(&update(EventCategory::Multicast)));
        assert!(!filter.matches(&update(EventCategory::Link)));
    }
}
