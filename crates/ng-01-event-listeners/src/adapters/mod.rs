//! Adapters for the listener registry.

mod channel_forwarder;

pub use channel_forwarder::{ChannelForwarder, DEFAULT_EVENT_CHANNEL_CAPACITY, DEFAULT_FORWARD_TIMEOUT};
