//! # Shared Types Crate
//!
//! This crate contains the connectivity data model and the ports that more
//! than one subsystem depends on.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Every type crossing a crate boundary is
//!   defined here (`NetworkEvent`, `ConnectivityStatus`, `CredentialRecord`).
//! - **Ports, not globals**: Cross-cutting collaborators (`EventNotifier`,
//!   `FatalErrorSink`) are traits injected at construction.
//! - **Explicit classification**: Fatal conditions are a single enum
//!   (`FatalError`) raised through one sink.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod credentials;
pub mod entities;
pub mod errors;
pub mod ports;

/// Recording port implementations.
/// Requires feature: `test-utils`
#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use credentials::*;
pub use entities::*;
pub use errors::*;
pub use ports::{EventNotifier, FatalErrorSink};
