//! # Bootstrap Integration Tests
//!
//! Runs the wired runtime against the simulated network stack.
//!
//! ## Test Strategy
//!
//! Each test builds a `StartupConfig` with zero settle delays, wires a
//! `NodeRuntime` around a `SimulatedNetworkStack` and drives `start` to
//! completion (or to its fatal error).

use std::sync::Arc;
use std::time::Duration;

use node_runtime::adapters::{
    InMemoryCredentialStore, LoggingWorkload, SimulatedNetworkStack, SimulatedOutcome, WorkloadSet,
};
use node_runtime::container::{
    ConnectivityDriver, CredentialMode, StartupConfig, TimingConfig, WorkloadKind,
};
use node_runtime::{ConnectAttempt, NodeRuntime, RuntimeDependencies};
use shared_bus::StatusPublisher;
use shared_types::{
    ConnectError, ConnectivityStatus, CredentialRecord, FatalError, InterfaceId, SecurityType,
};
use tokio::time::timeout;

fn config(mode: CredentialMode, driver: ConnectivityDriver) -> StartupConfig {
    let mut config = StartupConfig {
        timing: TimingConfig::immediate(),
        ..StartupConfig::default()
    };
    config.credentials.mode = mode;
    config.connectivity.driver = driver;
    config
}

fn deps(stack: Arc<SimulatedNetworkStack>, records: Vec<CredentialRecord>) -> RuntimeDependencies {
    RuntimeDependencies {
        stack,
        credentials: Arc::new(InMemoryCredentialStore::new(records)),
        workloads: WorkloadSet::logging(),
    }
}

fn wlan_stack() -> SimulatedNetworkStack {
    SimulatedNetworkStack::new(Some(InterfaceId::from("wlan0")))
}

/// A provisioned record is applied, the stack associates and the gate opens.
#[tokio::test]
async fn test_auto_provision_end_to_end() {
    // Arrange
    let stack = Arc::new(wlan_stack().with_event_delay(Duration::from_millis(5)));
    let record = CredentialRecord::with_secret("home", SecurityType::Psk, "hunter22");
    let mut runtime = NodeRuntime::new(
        config(CredentialMode::AutoProvision, ConnectivityDriver::Gate),
        deps(stack.clone(), vec![record]),
    );

    // Act
    let report = timeout(Duration::from_secs(2), runtime.start())
        .await
        .expect("Bootstrap should finish within timeout")
        .expect("Bootstrap should succeed");

    // Assert
    assert_eq!(report.interface, InterfaceId::from("wlan0"));
    assert_eq!(
        report.connect,
        ConnectAttempt::Requested {
            ssid: "home".into()
        }
    );
    assert!(report.gate_waited);
    assert_eq!(report.status, Some(ConnectivityStatus::Connected));

    let requests = stack.connect_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].psk.as_deref(), Some("hunter22"));

    assert!(runtime.context().gate.is_signalled());
    assert_eq!(runtime.reducer_metrics().connected_published, 1);
    assert!(runtime.fatal_signal().raised().is_none());
    runtime.shutdown();
}

/// A failing stored-configuration connect is fatal and never reaches the wait.
#[tokio::test]
async fn test_static_connect_failure_is_fatal() {
    // Arrange
    let stack = Arc::new(wlan_stack().with_stored_configuration(false));
    let mut runtime = NodeRuntime::new(
        config(CredentialMode::Static, ConnectivityDriver::Gate),
        deps(stack.clone(), vec![]),
    );

    // Act
    let err = timeout(Duration::from_secs(1), runtime.start())
        .await
        .expect("Bootstrap should not block on the gate")
        .expect_err("Bootstrap should fail");

    // Assert
    assert_eq!(
        err,
        FatalError::StaticConnectFailed(ConnectError::NoStoredConfiguration)
    );
    assert_eq!(runtime.fatal_signal().raised(), Some(err));
    assert_eq!(stack.stored_connect_requests(), 1);
    assert!(!runtime.context().gate.is_signalled());
}

/// Static mode with a working stored configuration.
#[tokio::test]
async fn test_static_connect_success() {
    let stack = Arc::new(wlan_stack());
    let mut runtime = NodeRuntime::new(
        config(CredentialMode::Static, ConnectivityDriver::Gate),
        deps(stack.clone(), vec![]),
    );

    let report = timeout(Duration::from_secs(2), runtime.start())
        .await
        .expect("timeout")
        .unwrap();

    assert_eq!(report.connect, ConnectAttempt::StoredRequested);
    assert_eq!(report.status, Some(ConnectivityStatus::Connected));
    assert!(stack.connect_requests().is_empty());
}

/// A link failure publishes nothing and leaves the gate closed.
#[tokio::test]
async fn test_link_failure_keeps_gate_closed() {
    // Arrange
    let stack = Arc::new(wlan_stack().with_outcome(SimulatedOutcome::LinkFailure { status_code: 16 }));
    let mut runtime = NodeRuntime::new(
        config(CredentialMode::Static, ConnectivityDriver::Gate),
        deps(stack, vec![]),
    );

    // Act: bootstrap blocks on the gate
    let result = timeout(Duration::from_millis(200), runtime.start()).await;

    // Assert
    assert!(result.is_err(), "Bootstrap should still be waiting");
    assert_eq!(runtime.context().bus.latest(), None);
    assert!(!runtime.context().gate.is_signalled());

    let metrics = runtime.reducer_metrics();
    assert_eq!(metrics.link_failures, 1);
    assert_eq!(metrics.published(), 0);
    runtime.shutdown();
}

/// With nothing provisioned the sequence still proceeds to the wait.
#[tokio::test]
async fn test_empty_store_proceeds_to_wait() {
    // Arrange
    let stack = Arc::new(wlan_stack());
    let mut runtime = NodeRuntime::new(
        config(CredentialMode::AutoProvision, ConnectivityDriver::Gate),
        deps(stack.clone(), vec![]),
    );
    let gate = runtime.context().gate.clone();

    // Act: the address arrives from elsewhere, e.g. a manual connect
    let injector = {
        let stack = stack.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stack
                .inject(&"wlan0".into(), shared_types::NetworkEvent::AddressChange { added: true })
                .await
        })
    };
    let report = timeout(Duration::from_secs(2), runtime.start())
        .await
        .expect("timeout")
        .unwrap();

    // Assert
    assert_eq!(report.connect, ConnectAttempt::NoConfiguration);
    assert!(report.gate_waited);
    assert!(gate.is_signalled());
    assert!(stack.connect_requests().is_empty());
    assert!(injector.await.unwrap() > 0);
}

/// The external driver skips the gate entirely.
#[tokio::test]
async fn test_external_driver_does_not_wait() {
    let stack = Arc::new(wlan_stack());
    let mut runtime = NodeRuntime::new(
        config(CredentialMode::None, ConnectivityDriver::External),
        deps(stack.clone(), vec![]),
    );

    let report = timeout(Duration::from_millis(500), runtime.start())
        .await
        .expect("timeout")
        .unwrap();

    assert_eq!(report.connect, ConnectAttempt::NotRequested);
    assert!(!report.gate_waited);
    assert_eq!(report.status, None);
    assert_eq!(stack.stored_connect_requests(), 0);
}

/// The gate opens and is counted even when the sequencer never waits on it.
#[tokio::test]
async fn test_gate_opening_counted_without_wait() {
    // Arrange
    let stack = Arc::new(wlan_stack());
    let mut runtime = NodeRuntime::new(
        config(CredentialMode::AutoProvision, ConnectivityDriver::External),
        deps(stack, vec![CredentialRecord::open("cafe")]),
    );

    // Act
    let report = runtime.start().await.unwrap();
    let gate = runtime.context().gate.clone();
    timeout(Duration::from_secs(1), async {
        while !gate.is_signalled() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("Gate should open from the stack's address event");

    // Assert
    assert!(!report.gate_waited);
    assert_eq!(runtime.reducer_metrics().gate_opened, 1);
    assert!(netgate_telemetry::metrics::GATE_SIGNALS.get() >= 1.0);
    runtime.shutdown();
}

#[tokio::test]
async fn test_missing_interface_is_fatal() {
    let stack = Arc::new(SimulatedNetworkStack::new(None));
    let mut runtime = NodeRuntime::new(
        config(CredentialMode::AutoProvision, ConnectivityDriver::Gate),
        deps(stack, vec![CredentialRecord::open("cafe")]),
    );

    let err = timeout(Duration::from_millis(500), runtime.start())
        .await
        .expect("timeout")
        .unwrap_err();

    assert_eq!(err, FatalError::MissingInterface);
    assert_eq!(runtime.registry().listener_count(), 0);
}

#[tokio::test]
async fn test_configured_workload_runs_once() {
    // Arrange
    let workload = Arc::new(LoggingWorkload::new("probe"));
    let mut config = config(CredentialMode::None, ConnectivityDriver::External);
    config.workload.kind = WorkloadKind::HttpGet;

    let mut deps = deps(Arc::new(wlan_stack()), vec![]);
    deps.workloads = WorkloadSet::new().with(WorkloadKind::HttpGet, workload.clone());
    let mut runtime = NodeRuntime::new(config, deps);

    // Act
    let report = runtime.start().await.unwrap();

    // Assert
    assert_eq!(report.workload, WorkloadKind::HttpGet);
    assert_eq!(workload.runs(), 1);
}

#[tokio::test]
async fn test_unregistered_workload_is_fatal() {
    let mut config = config(CredentialMode::None, ConnectivityDriver::External);
    config.workload.kind = WorkloadKind::DumbHttpServer;

    let mut deps = deps(Arc::new(wlan_stack()), vec![]);
    deps.workloads = WorkloadSet::new();
    let mut runtime = NodeRuntime::new(config, deps);

    let err = runtime.start().await.unwrap_err();
    assert_eq!(err, FatalError::WorkloadUnavailable("dumb_http_server".into()));
}

#[cfg(feature = "multicast")]
mod multicast {
    use super::*;
    use ng_03_multicast_membership::{InMemoryMulticastBackend, SSDP_GROUP};
    use shared_types::EventCategory;

    fn multicast_config() -> StartupConfig {
        let mut config = config(CredentialMode::None, ConnectivityDriver::External);
        config.multicast.enabled = true;
        config
    }

    #[tokio::test]
    async fn test_discovery_group_joined_after_bootstrap() {
        // Arrange
        let backend = Arc::new(InMemoryMulticastBackend::new());
        let mut runtime = NodeRuntime::new(multicast_config(), deps(Arc::new(wlan_stack()), vec![]))
            .with_multicast_backend(backend.clone());

        // Act
        let report = runtime.start().await.unwrap();

        // Assert
        let wlan = InterfaceId::from("wlan0");
        assert_eq!(report.multicast_group, Some(SSDP_GROUP));
        let manager = runtime.multicast().expect("manager");
        assert!(manager.is_member(&wlan, SSDP_GROUP));
        assert_eq!(backend.attached(&wlan), 1);
        assert!(backend.is_monitored(&wlan));

        // The membership change went through the registry
        assert_eq!(runtime.registry().metrics().events_for(EventCategory::Multicast), 1);
    }

    /// Leaving the discovery group is reported as Disconnected on the bus.
    #[tokio::test]
    async fn test_leave_publishes_disconnected() {
        // Arrange: joined, and the join already reduced to Connected
        let mut runtime = NodeRuntime::new(multicast_config(), deps(Arc::new(wlan_stack()), vec![]));
        runtime.start().await.unwrap();
        let bus = runtime.context().bus.clone();
        timeout(Duration::from_secs(1), async {
            while bus.latest() != Some(ConnectivityStatus::Connected) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("Join should publish Connected");
        let mut subscription = bus.subscribe();

        // Act
        let manager = runtime.multicast().expect("manager");
        manager.leave(&"wlan0".into(), SSDP_GROUP).await.unwrap();

        // Assert
        let update = timeout(Duration::from_secs(1), subscription.recv())
            .await
            .expect("timeout")
            .expect("update");
        assert_eq!(update.status, ConnectivityStatus::Disconnected);
        assert_eq!(update.cause, EventCategory::Multicast);
        assert_eq!(bus.latest(), Some(ConnectivityStatus::Disconnected));
        assert_eq!(runtime.reducer_metrics().disconnected_published, 1);
        runtime.shutdown();
    }

    #[tokio::test]
    async fn test_out_of_group_slots_is_fatal() {
        let mut runtime = NodeRuntime::new(multicast_config(), deps(Arc::new(wlan_stack()), vec![]))
            .with_multicast_backend(Arc::new(InMemoryMulticastBackend::with_slots(0)));

        let err = runtime.start().await.unwrap_err();
        assert_eq!(
            err,
            FatalError::MulticastOutOfResources {
                interface: "wlan0".into(),
                group: SSDP_GROUP,
            }
        );
    }

    #[tokio::test]
    async fn test_multicast_disabled_joins_nothing() {
        let mut runtime = NodeRuntime::new(
            config(CredentialMode::None, ConnectivityDriver::External),
            deps(Arc::new(wlan_stack()), vec![]),
        );

        let report = runtime.start().await.unwrap();
        assert_eq!(report.multicast_group, None);
        assert!(runtime.multicast().is_none());
    }
}
