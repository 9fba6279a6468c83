//! Delivery counters for the listener registry
//!
//! Thread-safe counters the runtime exports to its metrics registry.

use shared_types::EventCategory;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for event dispatch
#[derive(Default)]
pub struct RegistryMetrics {
    /// Events dispatched, by category
    link_events: AtomicU64,
    address_events: AtomicU64,
    multicast_events: AtomicU64,
    /// Events that matched no listener
    unmatched_events: AtomicU64,
    /// Successful handler invocations
    deliveries: AtomicU64,
    /// Failed handler invocations
    delivery_failures: AtomicU64,
}

impl RegistryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one dispatched event and how it went
    pub fn record_dispatch(&self, category: EventCategory, delivered: usize, failed: usize) {
        let counter = match category {
            EventCategory::Link => &self.link_events,
            EventCategory::Address => &self.address_events,
            EventCategory::Multicast => &self.multicast_events,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if delivered == 0 && failed == 0 {
            self.unmatched_events.fetch_add(1, Ordering::Relaxed);
        }
        self.deliveries.fetch_add(delivered as u64, Ordering::Relaxed);
        self.delivery_failures.fetch_add(failed as u64, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> RegistryMetricsSnapshot {
        RegistryMetricsSnapshot {
            link_events: self.link_events.load(Ordering::Relaxed),
            address_events: self.address_events.load(Ordering::Relaxed),
            multicast_events: self.multicast_events.load(Ordering::Relaxed),
            unmatched_events: self.unmatched_events.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistryMetricsSnapshot {
    pub link_events: u64,
    pub address_events: u64,
    pub multicast_events: u64,
    pub unmatched_events: u64,
    pub deliveries: u64,
    pub delivery_failures: u64,
}

impl RegistryMetricsSnapshot {
    /// Events dispatched for `category`.
    pub fn events_for(&self, category: EventCategory) -> u64 {
        match category {
            EventCategory::Link => self.link_events,
            EventCategory::Address => self.address_events,
            EventCategory::Multicast => self.multicast_events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_dispatch() {
        let metrics = RegistryMetrics::new();
        metrics.record_dispatch(EventCategory::Address, 2, 0);
        metrics.record_dispatch(EventCategory::Link, 0, 0);
        metrics.record_dispatch(EventCategory::Multicast, 0, 1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.address_events, 1);
        assert_eq!(snapshot.link_events, 1);
        assert_eq!(snapshot.multicast_events, 1);
        assert_eq!(snapshot.unmatched_events, 1);
        assert_eq!(snapshot.deliveries, 2);
        assert_eq!(snapshot.delivery_failures, 1);
        assert_eq!(snapshot.events_for(EventCategory::Address), 1);
    }
}
