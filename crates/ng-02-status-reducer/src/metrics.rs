//! Reducer counters

use shared_types::ConnectivityStatus;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the reducer task
#[derive(Default)]
pub struct ReducerMetrics {
    events_applied: AtomicU64,
    connected_published: AtomicU64,
    disconnected_published: AtomicU64,
    /// Link results that reported failure
    link_failures: AtomicU64,
    publish_failures: AtomicU64,
    gate_opened: AtomicU64,
}

impl ReducerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&self) {
        self.events_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_published(&self, status: ConnectivityStatus) {
        let counter = match status {
            ConnectivityStatus::Connected => &self.connected_published,
            ConnectivityStatus::Disconnected => &self.disconnected_published,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_link_failure(&self) {
        self.link_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_publish_failure(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_gate_opened(&self) {
        self.gate_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ReducerMetricsSnapshot {
        ReducerMetricsSnapshot {
            events_applied: self.events_applied.load(Ordering::Relaxed),
            connected_published: self.connected_published.load(Ordering::Relaxed),
            disconnected_published: self.disconnected_published.load(Ordering::Relaxed),
            link_failures: self.link_failures.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
            gate_opened: self.gate_opened.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReducerMetricsSnapshot {
    pub events_applied: u64,
    pub connected_published: u64,
    pub disconnected_published: u64,
    pub link_failures: u64,
    pub publish_failures: u64,
    /// Signals that actually opened the gate; at most 1
    pub gate_opened: u64,
}

impl ReducerMetricsSnapshot {
    /// Statuses published, of either kind.
    pub fn published(&self) -> u64 {
        self.connected_published + self.disconnected_published
    }
}
