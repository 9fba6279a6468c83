//! # Bootstrap Sequence
//!
//! One pass per process:
//!
//! 1. Resolve the default interface
//! 2. Register the reducer's listeners on it
//! 3. Request connectivity according to the credential mode
//! 4. Wait on the gate (unless connectivity is driven externally)
//! 5. Join the discovery multicast group when enabled
//! 6. Run the configured workload

mod sequencer;

pub use sequencer::{BootstrapSequencer, RuntimeDependencies};

use crate::container::{ConnectivityDriver, CredentialMode, WorkloadKind};
use ng_01_event_listeners::RegistryError;
use serde::Serialize;
use shared_types::{ConnectError, ConnectivityStatus, FatalError, InterfaceId};
use std::net::Ipv4Addr;
use thiserror::Error;

/// Conditions that stop the bootstrap sequence. All are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    #[error("Network stack reported no default interface")]
    MissingInterface,

    #[error("Listener registration failed: {0}")]
    Registration(#[from] RegistryError),

    #[error("Static connect failed: {0}")]
    StaticConnect(ConnectError),

    #[error("Out of multicast resources joining {group} on {interface}")]
    MulticastOutOfResources { interface: InterfaceId, group: Ipv4Addr },

    #[error("Workload {0} is selected but not registered")]
    WorkloadUnavailable(WorkloadKind),
}

impl From<BootstrapError> for FatalError {
    fn from(err: BootstrapError) -> Self {
        match err {
            BootstrapError::MissingInterface => FatalError::MissingInterface,
            BootstrapError::Registration(e) => FatalError::ListenerRegistration(e.to_string()),
            BootstrapError::StaticConnect(e) => FatalError::StaticConnectFailed(e),
            BootstrapError::MulticastOutOfResources { interface, group } => {
                FatalError::MulticastOutOfResources { interface, group }
            }
            BootstrapError::WorkloadUnavailable(kind) => {
                FatalError::WorkloadUnavailable(kind.to_string())
            }
        }
    }
}

/// What the connect step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConnectAttempt {
    /// Credential mode `none`.
    NotRequested,
    /// Auto-provisioning found no usable record.
    NoConfiguration,
    /// A provisioned record was applied.
    Requested { ssid: String },
    /// Applying a provisioned record failed; bootstrap continued.
    RequestFailed { ssid: String, error: String },
    /// The stack was asked to use its stored configuration.
    StoredRequested,
}

/// Summary of a completed bootstrap, logged as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub interface: InterfaceId,
    pub credential_mode: CredentialMode,
    pub connect: ConnectAttempt,
    pub driver: ConnectivityDriver,
    pub gate_waited: bool,
    pub multicast_group: Option<Ipv4Addr>,
    pub workload: WorkloadKind,
    pub status: Option<ConnectivityStatus>,
}
