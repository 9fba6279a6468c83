//! # Runtime Wiring
//!
//! Builds the connectivity pipeline once and runs the bootstrap sequence.
//!
//! ```text
//!  NetworkStack ──notify──→ EventListenerRegistry ──ChannelForwarder──┐
//!       ▲                          ▲                                  │
//!       │ connect                  │ MulticastChange                  ▼
//!  BootstrapSequencer     MulticastMembershipManager          mpsc<InterfaceEvent>
//!       │                                                             │
//!       │ wait                                                        ▼
//!       └──────────────── Gate ◄──────────────────────────────  StatusReducer
//!                                                                     │
//!                                                                     ▼
//!                                                             ConnectivityBus
//! ```
//!
//! Every fatal condition, wherever it is detected, ends up on the single
//! `FatalSignal`; `start` returns the first one.

use crate::adapters::FatalSignal;
use crate::bootstrap::{BootstrapReport, BootstrapSequencer, RuntimeDependencies};
use crate::container::StartupConfig;
use ng_01_event_listeners::EventListenerRegistry;
use ng_02_status_reducer::{ConnectivityContext, ReducerMetricsSnapshot, StatusReducer};
use shared_bus::ConnectivityBus;
use shared_types::{FatalError, FatalErrorSink, InterfaceEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[cfg(feature = "multicast")]
use ng_03_multicast_membership::{
    InMemoryMulticastBackend, MulticastBackend, MulticastMembershipManager,
};

/// The wired connectivity runtime.
pub struct NodeRuntime {
    config: StartupConfig,
    deps: RuntimeDependencies,
    context: ConnectivityContext,
    fatal: Arc<FatalSignal>,
    registry: Arc<EventListenerRegistry>,
    reducer: Arc<StatusReducer>,
    #[cfg(feature = "multicast")]
    multicast: Option<Arc<MulticastMembershipManager>>,
    tasks: Vec<JoinHandle<()>>,
}

impl NodeRuntime {
    /// Wire the runtime.
    ///
    /// The registry is attached to the network stack here, so events the
    /// stack raises from now on reach the registered listeners.
    pub fn new(config: StartupConfig, deps: RuntimeDependencies) -> Self {
        let connectivity = &config.connectivity;
        let bus = Arc::new(ConnectivityBus::with_settings(
            connectivity.subscriber_capacity,
            connectivity.publish_timeout(),
        ));
        let context = ConnectivityContext::new(bus);

        let fatal = Arc::new(FatalSignal::new());
        let registry = Arc::new(EventListenerRegistry::new(fatal.clone()));
        deps.stack.attach_notifier(registry.clone());

        let reducer = Arc::new(StatusReducer::new(context.clone()));

        #[cfg(feature = "multicast")]
        let multicast = config.multicast.enabled.then(|| {
            let backend = Arc::new(InMemoryMulticastBackend::with_slots(
                config.multicast.group_slots,
            ));
            Arc::new(MulticastMembershipManager::new(backend, registry.clone()))
        });

        #[cfg(not(feature = "multicast"))]
        if config.multicast.enabled {
            warn!("[runtime] Multicast enabled in configuration but not compiled in");
        }

        info!(
            credential_mode = ?config.credentials.mode,
            driver = ?config.connectivity.driver,
            workload = %config.workload.kind,
            "[runtime] Runtime wired"
        );

        Self {
            config,
            deps,
            context,
            fatal,
            registry,
            reducer,
            #[cfg(feature = "multicast")]
            multicast,
            tasks: Vec::new(),
        }
    }

    /// Replace the multicast backend the membership manager drives.
    ///
    /// No effect when multicast is disabled in the configuration.
    #[cfg(feature = "multicast")]
    #[must_use]
    pub fn with_multicast_backend(mut self, backend: Arc<dyn MulticastBackend>) -> Self {
        if self.multicast.is_some() {
            self.multicast = Some(Arc::new(MulticastMembershipManager::new(
                backend,
                self.registry.clone(),
            )));
        }
        self
    }

    /// Start the reducer and run the bootstrap sequence.
    ///
    /// Call once. Returns the report when the sequence completes, or the
    /// first fatal error raised anywhere in the runtime before that.
    pub async fn start(&mut self) -> Result<BootstrapReport, FatalError> {
        info!("===========================================");
        info!("  Netgate v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let (events_tx, events_rx) = mpsc::channel(self.config.connectivity.event_queue_capacity);
        self.spawn_reducer(events_rx);
        self.spawn_status_metrics();

        let sequencer = self.sequencer(events_tx);
        let outcome = tokio::select! {
            biased;
            err = self.fatal.wait() => Err(err),
            result = sequencer.run() => result.map_err(FatalError::from),
        };

        match outcome {
            Ok(report) => {
                match serde_json::to_string(&report) {
                    Ok(json) => info!(report = %json, "[runtime] Bootstrap complete"),
                    Err(e) => warn!(error = %e, "[runtime] Bootstrap report not serializable"),
                }
                Ok(report)
            }
            Err(err) => {
                self.fatal.raise(err.clone());
                Err(self.fatal.raised().unwrap_or(err))
            }
        }
    }

    fn sequencer(&self, events: mpsc::Sender<InterfaceEvent>) -> BootstrapSequencer {
        let sequencer = BootstrapSequencer::new(
            self.config.clone(),
            self.context.clone(),
            self.registry.clone(),
            events,
            self.deps.clone(),
        );
        #[cfg(feature = "multicast")]
        let sequencer = match &self.multicast {
            Some(manager) => sequencer.with_multicast(manager.clone()),
            None => sequencer,
        };
        sequencer
    }

    fn spawn_reducer(&mut self, events: mpsc::Receiver<InterfaceEvent>) {
        let reducer = self.reducer.clone();
        let fatal = self.fatal.clone();
        self.tasks.push(tokio::spawn(async move {
            match reducer.run(events).await {
                Ok(()) => fatal.raise(FatalError::ReducerStopped("event channel closed".into())),
                Err(e) => fatal.raise(e.into()),
            }
        }));
    }

    fn spawn_status_metrics(&mut self) {
        let mut subscription = self.context.bus.subscribe();
        self.tasks.push(tokio::spawn(async move {
            while let Some(update) = subscription.recv().await {
                debug!(sequence = update.sequence, status = %update.status, "[runtime] Status observed");
                netgate_telemetry::record_status(update.status);
            }
        }));
    }

    /// Stop the background tasks.
    pub fn shutdown(self) {
        info!(tasks = self.tasks.len(), "[runtime] Shutting down");
        for task in self.tasks {
            task.abort();
        }
    }

    pub fn context(&self) -> &ConnectivityContext {
        &self.context
    }

    pub fn registry(&self) -> Arc<EventListenerRegistry> {
        self.registry.clone()
    }

    pub fn fatal_signal(&self) -> Arc<FatalSignal> {
        self.fatal.clone()
    }

    pub fn reducer_metrics(&self) -> ReducerMetricsSnapshot {
        self.reducer.metrics()
    }

    #[cfg(feature = "multicast")]
    pub fn multicast(&self) -> Option<Arc<MulticastMembershipManager>> {
        self.multicast.clone()
    }
}
