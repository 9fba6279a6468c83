//! Bootstrap sequencer.

use super::{BootstrapError, BootstrapReport, ConnectAttempt};
use crate::adapters::{MetricsRecorder, WorkloadSet};
use crate::container::{ConnectivityDriver, CredentialMode, StartupConfig, WorkloadKind};
use crate::ports::{CredentialStore, NetworkStack};
use ng_01_event_listeners::{ChannelForwarder, EventListenerRegistry, EventMask};
use ng_02_status_reducer::ConnectivityContext;
use shared_bus::StatusPublisher;
use shared_types::{ConnectRequest, InterfaceEvent, InterfaceId};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[cfg(feature = "multicast")]
use ng_03_multicast_membership::{MulticastError, MulticastMembershipManager};

/// External collaborators the runtime is built with.
#[derive(Clone)]
pub struct RuntimeDependencies {
    pub stack: Arc<dyn NetworkStack>,
    pub credentials: Arc<dyn CredentialStore>,
    pub workloads: WorkloadSet,
}

/// Runs the bootstrap sequence once.
pub struct BootstrapSequencer {
    config: StartupConfig,
    context: ConnectivityContext,
    registry: Arc<EventListenerRegistry>,
    events: mpsc::Sender<InterfaceEvent>,
    deps: RuntimeDependencies,
    #[cfg(feature = "multicast")]
    multicast: Option<Arc<MulticastMembershipManager>>,
}

impl BootstrapSequencer {
    pub fn new(
        config: StartupConfig,
        context: ConnectivityContext,
        registry: Arc<EventListenerRegistry>,
        events: mpsc::Sender<InterfaceEvent>,
        deps: RuntimeDependencies,
    ) -> Self {
        Self {
            config,
            context,
            registry,
            events,
            deps,
            #[cfg(feature = "multicast")]
            multicast: None,
        }
    }

    /// Drive group membership through `manager` when multicast is enabled.
    #[cfg(feature = "multicast")]
    #[must_use]
    pub fn with_multicast(mut self, manager: Arc<MulticastMembershipManager>) -> Self {
        self.multicast = Some(manager);
        self
    }

    fn multicast_enabled(&self) -> bool {
        cfg!(feature = "multicast") && self.config.multicast.enabled
    }

    /// Run the sequence.
    ///
    /// # Errors
    ///
    /// Every error is fatal; the sequence stops at the failing step.
    pub async fn run(&self) -> Result<BootstrapReport, BootstrapError> {
        let interface = self.deps.stack.default_interface().ok_or_else(|| {
            error!("[bootstrap] Network stack returned no default interface");
            BootstrapError::MissingInterface
        })?;
        info!(interface = %interface, "[bootstrap] Default interface resolved");

        self.register_listeners(&interface)?;

        let connect = self.request_connectivity(&interface).await?;

        let gate_waited = self.await_connectivity().await;

        let multicast_group = self.join_discovery_group(&interface).await?;

        let workload = self.dispatch_workload().await?;

        info!(interface = %interface, "[bootstrap] Network thread init finished");
        Ok(BootstrapReport {
            interface,
            credential_mode: self.config.credentials.mode,
            connect,
            driver: self.config.connectivity.driver,
            gate_waited,
            multicast_group,
            workload,
            status: self.context.bus.latest(),
        })
    }

    fn register_listeners(&self, interface: &InterfaceId) -> Result<(), BootstrapError> {
        let forward_timeout = self.config.connectivity.forward_timeout();
        let mut masks = vec![EventMask::LINK, EventMask::ADDRESS];
        if self.multicast_enabled() {
            masks.push(EventMask::MULTICAST);
        }

        let mut recorded = EventMask::empty();
        for mask in masks {
            let forwarder = ChannelForwarder::with_timeout(self.events.clone(), forward_timeout);
            self.registry
                .register(interface.clone(), mask, Arc::new(forwarder))?;
            recorded |= mask;
        }
        self.registry
            .register(interface.clone(), recorded, Arc::new(MetricsRecorder))?;

        info!(
            interface = %interface,
            listeners = self.registry.listener_count(),
            "[bootstrap] Event listeners registered"
        );
        Ok(())
    }

    async fn request_connectivity(
        &self,
        interface: &InterfaceId,
    ) -> Result<ConnectAttempt, BootstrapError> {
        let timing = &self.config.timing;
        match self.config.credentials.mode {
            CredentialMode::AutoProvision => {
                tokio::time::sleep(timing.provisioning_settle()).await;
                Ok(self.apply_provisioned(interface).await)
            }
            CredentialMode::Static => {
                // The supplicant needs a moment before it takes requests.
                tokio::time::sleep(timing.static_settle()).await;
                self.deps
                    .stack
                    .request_connect_stored(interface)
                    .await
                    .map_err(|e| {
                        error!(interface = %interface, error = %e, "[bootstrap] Connecting with stored configuration failed");
                        BootstrapError::StaticConnect(e)
                    })?;
                info!(interface = %interface, "[bootstrap] Stored configuration connect requested");
                Ok(ConnectAttempt::StoredRequested)
            }
            CredentialMode::None => Ok(ConnectAttempt::NotRequested),
        }
    }

    async fn apply_provisioned(&self, interface: &InterfaceId) -> ConnectAttempt {
        let Some(record) = self.deps.credentials.lookup(&|r| !r.ssid.is_empty()) else {
            info!("[bootstrap] No configuration found");
            return ConnectAttempt::NoConfiguration;
        };

        info!(ssid = %record.ssid, "[bootstrap] Configuration found, applying");
        let request = ConnectRequest::from_record(&record);
        match self.deps.stack.request_connect(interface, request).await {
            Ok(()) => {
                info!(ssid = %record.ssid, "[bootstrap] Configuration applied");
                ConnectAttempt::Requested { ssid: record.ssid }
            }
            Err(e) => {
                error!(ssid = %record.ssid, error = %e, "[bootstrap] Cannot apply saved configuration");
                ConnectAttempt::RequestFailed {
                    ssid: record.ssid,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Returns whether the gate was waited on.
    async fn await_connectivity(&self) -> bool {
        match self.config.connectivity.driver {
            ConnectivityDriver::External => {
                info!("[bootstrap] Connectivity driven externally, not waiting");
                false
            }
            ConnectivityDriver::Gate => {
                info!("[bootstrap] Waiting for network connectivity");
                self.context.gate.wait().await;
                info!("[bootstrap] Network connected");
                tokio::time::sleep(self.config.timing.post_connect_settle()).await;
                true
            }
        }
    }

    #[cfg(feature = "multicast")]
    async fn join_discovery_group(
        &self,
        interface: &InterfaceId,
    ) -> Result<Option<Ipv4Addr>, BootstrapError> {
        if !self.multicast_enabled() {
            return Ok(None);
        }
        let Some(manager) = &self.multicast else {
            warn!("[bootstrap] Multicast enabled but no membership manager attached");
            return Ok(None);
        };

        let group = self.config.multicast.group;
        let joined = match manager.join(interface, group).await {
            Ok(()) => Some(group),
            Err(MulticastError::AlreadyJoined { .. }) => {
                warn!(interface = %interface, %group, "[bootstrap] Discovery group already joined");
                Some(group)
            }
            Err(e) if e.is_fatal() => {
                error!(interface = %interface, %group, error = %e, "[bootstrap] Joining discovery group failed");
                return Err(BootstrapError::MulticastOutOfResources {
                    interface: interface.clone(),
                    group,
                });
            }
            Err(e) => {
                warn!(interface = %interface, %group, error = %e, "[bootstrap] Discovery group not joined");
                None
            }
        };
        netgate_telemetry::set_multicast_memberships(manager.memberships().len());
        Ok(joined)
    }

    #[cfg(not(feature = "multicast"))]
    async fn join_discovery_group(
        &self,
        _interface: &InterfaceId,
    ) -> Result<Option<Ipv4Addr>, BootstrapError> {
        Ok(None)
    }

    async fn dispatch_workload(&self) -> Result<WorkloadKind, BootstrapError> {
        let kind = self.config.workload.kind;
        if kind == WorkloadKind::None {
            info!("[bootstrap] No workload configured");
            return Ok(kind);
        }

        let workload = self
            .deps
            .workloads
            .get(kind)
            .ok_or(BootstrapError::WorkloadUnavailable(kind))?;
        info!(workload = %kind, name = workload.name(), "[bootstrap] Starting workload");
        workload.run().await;
        Ok(kind)
    }
}
