//! Service layer for multicast membership.

mod manager;

pub use manager::MulticastMembershipManager;
