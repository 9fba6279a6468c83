//! Telemetry configuration from environment variables.

use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to startup logs
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive
    pub log_level: String,

    /// Emit JSON lines instead of pretty output
    pub json_logs: bool,

    /// Include source file and line in log lines
    pub with_source_location: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "netgate".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            with_source_location: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `NG_SERVICE_NAME`: Service name (default: netgate)
    /// - `RUST_LOG` or `NG_LOG_LEVEL`: Log filter (default: info)
    /// - `NG_JSON_LOGS`: JSON output (default: true inside containers)
    /// - `NG_LOG_SOURCE`: Include file and line (default: false)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self::from_lookup(|key| env::var(key).ok(), is_container)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>, json_default: bool) -> Self {
        let defaults = Self::default();
        Self {
            service_name: lookup("NG_SERVICE_NAME").unwrap_or(defaults.service_name),
            log_level: lookup("RUST_LOG")
                .or_else(|| lookup("NG_LOG_LEVEL"))
                .unwrap_or(defaults.log_level),
            json_logs: lookup("NG_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(json_default),
            with_source_location: lookup("NG_LOG_SOURCE")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.with_source_location),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
