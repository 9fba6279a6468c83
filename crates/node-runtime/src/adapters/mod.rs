//! # Adapter Implementations
//!
//! Concrete implementations of the runtime's ports plus the process-wide
//! fatal signal.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                    OUTER LAYER (Adapters)                        │
//! │  SimulatedNetworkStack, TomlCredentialStore, LoggingWorkload,    │
//! │  FatalSignal, MetricsRecorder                                    │
//! └──────────────────────────────────────────────────────────────────┘
//!                              ↑ implements ↑
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                    MIDDLE LAYER (Ports)                          │
//! │  NetworkStack, CredentialStore, ApplicationWorkload,             │
//! │  FatalErrorSink, EventHandler                                    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod credentials;
pub mod fatal_signal;
pub mod network_stack;
pub mod telemetry;
pub mod workload;

pub use credentials::{InMemoryCredentialStore, TomlCredentialStore};
pub use fatal_signal::FatalSignal;
pub use network_stack::{SimulatedNetworkStack, SimulatedOutcome};
pub use telemetry::MetricsRecorder;
pub use workload::{LoggingWorkload, WorkloadSet};
