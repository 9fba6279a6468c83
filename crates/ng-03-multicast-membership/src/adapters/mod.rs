//! Adapters for multicast membership.

mod in_memory;

pub use in_memory::{InMemoryMulticastBackend, DEFAULT_GROUP_SLOTS};
