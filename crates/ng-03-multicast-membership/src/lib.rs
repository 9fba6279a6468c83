//! # NG-03 Multicast Membership
//!
//! Tracks which IPv4 multicast groups each interface has joined and emits a
//! `MulticastChange` event whenever membership actually changes.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): `MembershipKey`, `MembershipState`, `GroupHandle`
//! - **Ports Layer** (`ports/`): `MulticastBackend`, the stack side that
//!   owns group resources and the multicast monitor
//! - **Service Layer** (`service/`): `MulticastMembershipManager`
//! - **Adapters Layer** (`adapters/`): `InMemoryMulticastBackend`
//!
//! ## Rules
//!
//! | Operation | Current state | Result |
//! |-----------|---------------|--------|
//! | join | NotMember | attach, Member, `joined` event |
//! | join | Member | `AlreadyJoined`, nothing else |
//! | leave | Member | release, NotMember, `left` event |
//! | leave | NotMember | `NotFound` |
//!
//! `OutOfResources` from the backend is fatal for the caller; the other
//! errors are reported and ignored.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryMulticastBackend, DEFAULT_GROUP_SLOTS};
pub use domain::{GroupHandle, MembershipKey, MembershipState, SSDP_GROUP};
pub use error::MulticastError;
pub use ports::MulticastBackend;
pub use service::MulticastMembershipManager;
