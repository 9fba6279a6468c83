//! # Netgate
//!
//! Brings a node onto the network once per boot, then hands over to the
//! configured workload.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging and metrics
//! 2. Resolve configuration (file named by `NG_CONFIG`, then `NG_*` overrides)
//! 3. Build the credential store and the network stack
//! 4. Wire the runtime and run the bootstrap sequence
//! 5. Stay up until Ctrl+C or a fatal error
//!
//! A fatal error ends the process with a non-zero exit status.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use netgate_telemetry::{init_telemetry, TelemetryConfig};
use node_runtime::adapters::{
    InMemoryCredentialStore, SimulatedNetworkStack, SimulatedOutcome, TomlCredentialStore,
    WorkloadSet,
};
use node_runtime::container::{SimulationConfig, StartupConfig};
use node_runtime::ports::CredentialStore;
use node_runtime::{NodeRuntime, RuntimeDependencies};
use shared_types::InterfaceId;
use tracing::{error, info};

fn credential_store(config: &StartupConfig) -> Result<Arc<dyn CredentialStore>> {
    match &config.credentials.store_path {
        Some(path) => {
            let store = TomlCredentialStore::load(path)
                .with_context(|| format!("Failed to load credential store {}", path.display()))?;
            info!(path = %path.display(), records = store.len(), "Credential store loaded");
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryCredentialStore::default())),
    }
}

fn network_stack(simulation: &SimulationConfig) -> SimulatedNetworkStack {
    let outcome = match simulation.link_failure_code {
        Some(status_code) => SimulatedOutcome::LinkFailure { status_code },
        None => SimulatedOutcome::Associate,
    };
    SimulatedNetworkStack::new(simulation.interface.clone().map(InterfaceId::new))
        .with_outcome(outcome)
        .with_stored_configuration(simulation.stored_configuration)
        .with_event_delay(Duration::from_millis(simulation.event_delay_ms))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(&TelemetryConfig::from_env())?;

    let config = StartupConfig::resolve().context("Failed to resolve configuration")?;

    let deps = RuntimeDependencies {
        stack: Arc::new(network_stack(&config.simulation)),
        credentials: credential_store(&config)?,
        workloads: WorkloadSet::logging(),
    };

    let mut runtime = NodeRuntime::new(config, deps);
    if let Err(err) = runtime.start().await {
        error!(kind = err.kind(), "Bootstrap aborted");
        runtime.shutdown();
        return Err(err.into());
    }

    info!("Node is running. Press Ctrl+C to stop.");
    let fatal = runtime.fatal_signal();
    let outcome = tokio::select! {
        signal = tokio::signal::ctrl_c() => signal.context("Failed to listen for Ctrl+C"),
        err = fatal.wait() => Err(err.into()),
    };

    runtime.shutdown();
    outcome
}
