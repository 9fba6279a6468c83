//! Prometheus metrics for Netgate.
//!
//! All metrics follow the naming convention: `ng_<component>_<metric>`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};
use shared_types::{ConnectivityStatus, EventCategory, FatalError};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::TelemetryError;

lazy_static! {
    /// Process metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Raw network events by category
    pub static ref NETWORK_EVENTS: CounterVec = CounterVec::new(
        Opts::new("ng_events_received_total", "Raw network events received"),
        &["category"]  // category: link/address/multicast
    ).expect("metric creation failed");

    /// Connectivity statuses published
    pub static ref STATUS_UPDATES: CounterVec = CounterVec::new(
        Opts::new("ng_bus_status_published_total", "Connectivity statuses published"),
        &["status"]  // status: connected/disconnected
    ).expect("metric creation failed");

    /// Effective gate signals (0 or 1)
    pub static ref GATE_SIGNALS: Counter = Counter::new(
        "ng_reducer_gate_signals_total",
        "Times the bootstrap gate was opened"
    ).expect("metric creation failed");

    /// Fatal errors by kind
    pub static ref FATAL_ERRORS: CounterVec = CounterVec::new(
        Opts::new("ng_fatal_errors_total", "Fatal errors raised"),
        &["kind"]
    ).expect("metric creation failed");

    /// Current multicast memberships
    pub static ref MULTICAST_MEMBERSHIPS: Gauge = Gauge::new(
        "ng_multicast_memberships",
        "Multicast groups currently joined"
    ).expect("metric creation failed");
}

static REGISTERED: AtomicBool = AtomicBool::new(false);

/// Keeps the registry registration alive.
#[derive(Debug)]
pub struct MetricsHandle {
    _private: (),
}

/// Register all metrics with the process registry.
///
/// Registering twice is a no-op.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    if REGISTERED.swap(true, Ordering::AcqRel) {
        return Ok(MetricsHandle { _private: () });
    }

    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(NETWORK_EVENTS.clone()),
        Box::new(STATUS_UPDATES.clone()),
        Box::new(GATE_SIGNALS.clone()),
        Box::new(FATAL_ERRORS.clone()),
        Box::new(MULTICAST_MEMBERSHIPS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle { _private: () })
}

pub fn record_event(category: EventCategory) {
    NETWORK_EVENTS.with_label_values(&[category.as_str()]).inc();
}

pub fn record_status(status: ConnectivityStatus) {
    STATUS_UPDATES.with_label_values(&[status.as_str()]).inc();
}

pub fn record_gate_signal() {
    GATE_SIGNALS.inc();
}

pub fn record_fatal(error: &FatalError) {
    FATAL_ERRORS.with_label_values(&[error.kind()]).inc();
}

pub fn set_multicast_memberships(count: usize) {
    MULTICAST_MEMBERSHIPS.set(count as f64);
}

/// Encode all metrics in Prometheus text format.
pub fn gather_text() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_twice() {
        register_metrics().unwrap();
        register_metrics().unwrap();
    }

    #[test]
    fn test_gather_includes_recorded_metrics() {
        register_metrics().unwrap();
        record_event(EventCategory::Address);
        record_status(ConnectivityStatus::Connected);
        record_fatal(&FatalError::MissingInterface);
        set_multicast_memberships(1);

        let text = gather_text().unwrap();
        assert!(text.contains("ng_events_received_total{category=\"address\"}"));
        assert!(text.contains("ng_bus_status_published_total{status=\"connected\"}"));
        assert!(text.contains("ng_fatal_errors_total{kind=\"missing_interface\"}"));
        assert!(text.contains("ng_multicast_memberships 1"));
    }

    #[test]
    fn test_gate_counter() {
        let before = GATE_SIGNALS.get();
        record_gate_signal();
        assert!(GATE_SIGNALS.get() >= before + 1.0);
    }
}
