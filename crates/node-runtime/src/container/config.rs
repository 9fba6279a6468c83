//! # Startup Configuration
//!
//! Resolved once before the bootstrap sequence starts: defaults, then an
//! optional TOML file, then `NG_*` environment overrides.
//!
//! ## Config File Format
//!
//! ```toml
//! [credentials]
//! mode = "auto_provision"       # auto_provision | static | none
//! store_path = "credentials.toml"
//!
//! [connectivity]
//! driver = "gate"               # gate | external
//! publish_timeout_ms = 1000
//!
//! [multicast]
//! enabled = true
//! group = "239.255.255.250"
//!
//! [timing]
//! provisioning_settle_ms = 5000
//! static_settle_ms = 1000
//! post_connect_settle_ms = 3000
//!
//! [workload]
//! kind = "http_server"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete startup configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StartupConfig {
    pub credentials: CredentialsConfig,
    pub connectivity: ConnectivityConfig,
    pub multicast: MulticastConfig,
    pub timing: TimingConfig,
    pub workload: WorkloadConfig,
    pub simulation: SimulationConfig,
}

/// How the node obtains Wi-Fi credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialMode {
    /// Look up a record provisioned at runtime and apply it.
    #[default]
    AutoProvision,
    /// Ask the stack to connect with its stored configuration.
    Static,
    /// Issue no connect request.
    None,
}

/// What decides that connectivity has been established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityDriver {
    /// Wait on the bootstrap gate.
    #[default]
    Gate,
    /// An external state machine owns connectivity; do not wait.
    External,
}

/// Application workload run once connectivity is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadKind {
    #[default]
    None,
    HttpClient,
    HttpGet,
    DumbHttpServer,
    HttpServer,
}

impl WorkloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::HttpClient => "http_client",
            Self::HttpGet => "http_get",
            Self::DumbHttpServer => "dumb_http_server",
            Self::HttpServer => "http_server",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the snake_case names used in config files.
macro_rules! impl_from_str {
    ($ty:ty, $key:literal, { $($name:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    _ => Err(ConfigError::InvalidValue {
                        key: $key.to_string(),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

impl_from_str!(CredentialMode, "credentials.mode", {
    "auto_provision" => CredentialMode::AutoProvision,
    "static" => CredentialMode::Static,
    "none" => CredentialMode::None,
});

impl_from_str!(ConnectivityDriver, "connectivity.driver", {
    "gate" => ConnectivityDriver::Gate,
    "external" => ConnectivityDriver::External,
});

impl_from_str!(WorkloadKind, "workload.kind", {
    "none" => WorkloadKind::None,
    "http_client" => WorkloadKind::HttpClient,
    "http_get" => WorkloadKind::HttpGet,
    "dumb_http_server" => WorkloadKind::DumbHttpServer,
    "http_server" => WorkloadKind::HttpServer,
});

/// Credential configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialsConfig {
    pub mode: CredentialMode,
    /// Read-only TOML credential store. Empty store when unset.
    pub store_path: Option<PathBuf>,
}

/// Connectivity pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectivityConfig {
    pub driver: ConnectivityDriver,
    /// How long a status publish waits for each subscriber.
    pub publish_timeout_ms: u64,
    /// Per-subscriber bus channel bound.
    pub subscriber_capacity: usize,
    /// Bound of the queue between the listener registry and the reducer.
    pub event_queue_capacity: usize,
    /// How long a listener waits for room in that queue.
    pub forward_timeout_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            driver: ConnectivityDriver::Gate,
            publish_timeout_ms: 1000,
            subscriber_capacity: shared_bus::DEFAULT_SUBSCRIBER_CAPACITY,
            event_queue_capacity: ng_01_event_listeners::DEFAULT_EVENT_CHANNEL_CAPACITY,
            forward_timeout_ms: 1000,
        }
    }
}

impl ConnectivityConfig {
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }

    pub fn forward_timeout(&self) -> Duration {
        Duration::from_millis(self.forward_timeout_ms)
    }
}

/// Multicast discovery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MulticastConfig {
    pub enabled: bool,
    pub group: Ipv4Addr,
    /// Group slots per interface in the in-memory backend.
    pub group_slots: usize,
}

impl Default for MulticastConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            group: Ipv4Addr::new(239, 255, 255, 250),
            group_slots: 4,
        }
    }
}

/// Settle delays around connect requests and the gate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Before looking up provisioned credentials.
    pub provisioning_settle_ms: u64,
    /// Before a static connect, while the supplicant comes up.
    pub static_settle_ms: u64,
    /// After the gate opens, before the workload starts.
    pub post_connect_settle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            provisioning_settle_ms: 5000,
            static_settle_ms: 1000,
            post_connect_settle_ms: 3000,
        }
    }
}

impl TimingConfig {
    /// All delays zero.
    pub fn immediate() -> Self {
        Self {
            provisioning_settle_ms: 0,
            static_settle_ms: 0,
            post_connect_settle_ms: 0,
        }
    }

    pub fn provisioning_settle(&self) -> Duration {
        Duration::from_millis(self.provisioning_settle_ms)
    }

    pub fn static_settle(&self) -> Duration {
        Duration::from_millis(self.static_settle_ms)
    }

    pub fn post_connect_settle(&self) -> Duration {
        Duration::from_millis(self.post_connect_settle_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkloadConfig {
    pub kind: WorkloadKind,
}

/// Settings for the simulated network stack the binary runs against.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Default interface name; `None` simulates a missing interface.
    pub interface: Option<String>,
    /// Delay before the stack reports each event.
    pub event_delay_ms: u64,
    /// Whether the stack holds a stored configuration for static connects.
    pub stored_configuration: bool,
    /// Link status code to report instead of a successful association.
    pub link_failure_code: Option<i32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            interface: Some("wlan0".to_string()),
            event_delay_ms: 100,
            stored_configuration: true,
            link_failure_code: None,
        }
    }
}

impl StartupConfig {
    /// Parse configuration from a TOML string. Missing keys keep defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve the configuration for this process.
    ///
    /// Loads the file named by `NG_CONFIG` if set, applies environment
    /// overrides and validates the result.
    pub fn resolve() -> Result<Self, ConfigError> {
        let base = match std::env::var("NG_CONFIG") {
            Ok(path) => Self::load(path)?,
            Err(_) => Self::default(),
        };
        let config = base.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `NG_*` overrides read through `lookup`.
    ///
    /// # Variables
    ///
    /// - `NG_CREDENTIAL_MODE`, `NG_CREDENTIAL_STORE`
    /// - `NG_CONNECTIVITY_DRIVER`, `NG_PUBLISH_TIMEOUT_MS`
    /// - `NG_MULTICAST_ENABLED`, `NG_MULTICAST_GROUP`
    /// - `NG_PROVISIONING_SETTLE_MS`, `NG_STATIC_SETTLE_MS`, `NG_POST_CONNECT_SETTLE_MS`
    /// - `NG_WORKLOAD`
    /// - `NG_INTERFACE`
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("NG_CREDENTIAL_MODE") {
            self.credentials.mode = v.parse()?;
        }
        if let Some(v) = lookup("NG_CREDENTIAL_STORE") {
            self.credentials.store_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("NG_CONNECTIVITY_DRIVER") {
            self.connectivity.driver = v.parse()?;
        }
        if let Some(v) = lookup("NG_PUBLISH_TIMEOUT_MS") {
            self.connectivity.publish_timeout_ms = parse_value("NG_PUBLISH_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("NG_MULTICAST_ENABLED") {
            self.multicast.enabled = parse_flag("NG_MULTICAST_ENABLED", &v)?;
        }
        if let Some(v) = lookup("NG_MULTICAST_GROUP") {
            self.multicast.group = parse_value("NG_MULTICAST_GROUP", &v)?;
        }
        if let Some(v) = lookup("NG_PROVISIONING_SETTLE_MS") {
            self.timing.provisioning_settle_ms = parse_value("NG_PROVISIONING_SETTLE_MS", &v)?;
        }
        if let Some(v) = lookup("NG_STATIC_SETTLE_MS") {
            self.timing.static_settle_ms = parse_value("NG_STATIC_SETTLE_MS", &v)?;
        }
        if let Some(v) = lookup("NG_POST_CONNECT_SETTLE_MS") {
            self.timing.post_connect_settle_ms = parse_value("NG_POST_CONNECT_SETTLE_MS", &v)?;
        }
        if let Some(v) = lookup("NG_WORKLOAD") {
            self.workload.kind = v.parse()?;
        }
        if let Some(v) = lookup("NG_INTERFACE") {
            self.simulation.interface = Some(v).filter(|name| !name.is_empty());
        }
        Ok(self)
    }

    /// Reject settings the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connectivity.publish_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "connectivity.publish_timeout_ms must be positive".to_string(),
            ));
        }
        if self.connectivity.forward_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "connectivity.forward_timeout_ms must be positive".to_string(),
            ));
        }
        if self.connectivity.event_queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "connectivity.event_queue_capacity must be positive".to_string(),
            ));
        }
        if self.multicast.enabled && !self.multicast.group.is_multicast() {
            return Err(ConfigError::Invalid(format!(
                "multicast.group {} is not an IPv4 multicast address",
                self.multicast.group
            )));
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
