//! # Startup Container
//!
//! Configuration resolved once at process start and handed to the runtime.

pub mod config;

pub use config::{
    ConfigError, ConnectivityConfig, ConnectivityDriver, CredentialMode, CredentialsConfig,
    MulticastConfig, SimulationConfig, StartupConfig, TimingConfig, WorkloadConfig, WorkloadKind,
};
