//! # Netgate Telemetry
//!
//! Logging and metrics for the Netgate runtime.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter` and either a
//!   pretty or a JSON formatting layer
//! - **Metrics**: Prometheus counters and gauges in a process registry,
//!   rendered in text exposition format
//!
//! ## Usage
//!
//! ```rust,ignore
//! use netgate_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `NG_LOG_LEVEL` | `info` | Log level filter, overridden by `RUST_LOG` |
//! | `NG_JSON_LOGS` | `false` | Emit JSON lines instead of pretty output |
//! | `NG_SERVICE_NAME` | `netgate` | Service name attached to startup logs |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingGuard};
pub use metrics::{
    gather_text, record_event, record_fatal, record_gate_signal, record_status, register_metrics,
    set_multicast_memberships, MetricsHandle,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register metrics.
///
/// Hold the returned guard for the lifetime of the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    let logging = init_logging(config)?;

    Ok(TelemetryGuard {
        _logging: logging,
        _metrics: metrics,
    })
}

/// Keeps telemetry active until dropped.
pub struct TelemetryGuard {
    _logging: LoggingGuard,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry");
    }
}
