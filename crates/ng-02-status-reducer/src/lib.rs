//! # NG-02 Status Reducer
//!
//! Folds the raw link, address and multicast events of an interface into a
//! single `ConnectivityStatus`, publishes it on the connectivity bus and
//! opens the bootstrap gate on the first address acquisition.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): the pure `reduce` function and the `Gate`
//! - **Service Layer** (`service/`): `StatusReducer`, the task that applies
//!   reductions, and `ConnectivityContext`, the bus and gate it shares with
//!   the bootstrap sequencer
//!
//! ## Reduction Table
//!
//! | Event | Status | Gate |
//! |-------|--------|------|
//! | `LinkResult { success: false }` | none | - |
//! | `LinkResult { success: true }` | none | - |
//! | `LinkDisconnected` | Disconnected | - |
//! | `AddressChange { added: true }` | Connected | signal |
//! | `AddressChange { added: false }` | Disconnected | - |
//! | `MulticastChange { joined: true }` | Connected | - |
//! | `MulticastChange { joined: false }` | Disconnected | - |
//!
//! Multicast membership is reported as connectivity. Consumers that need
//! to tell them apart filter bus updates by cause.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod error;
pub mod metrics;
pub mod service;

pub use domain::{reduce, Gate, Reduction};
pub use error::ReducerError;
pub use metrics::{ReducerMetrics, ReducerMetricsSnapshot};
pub use service::{ConnectivityContext, StatusReducer};
