//! # Node Runtime Library
//!
//! Exposes the runtime's modules for the binary and for tests. The main
//! entry point is the `netgate` binary in `main.rs`.
//!
//! ## Architectural Patterns
//!
//! - **Event-Driven**: raw stack events flow through the listener registry
//!   into the status reducer; nothing polls.
//! - **Hexagonal Architecture**: `ports` define the network stack, credential
//!   store and workload contracts; `adapters` implement them.
//! - **Plug-and-Play**: multicast membership is a cargo feature and every
//!   step of the bootstrap sequence is driven by `StartupConfig`.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod bootstrap;
pub mod container;
pub mod ports;
pub mod wiring;

pub use bootstrap::{
    BootstrapError, BootstrapReport, BootstrapSequencer, ConnectAttempt, RuntimeDependencies,
};
pub use container::{ConfigError, StartupConfig};
pub use wiring::NodeRuntime;
