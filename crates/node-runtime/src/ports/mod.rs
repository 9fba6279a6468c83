//! # External Ports
//!
//! Collaborators the bootstrap sequence drives but does not implement:
//! the network stack, the credential store and the application workloads.

use async_trait::async_trait;
use shared_types::{ConnectError, ConnectRequest, CredentialRecord, EventNotifier, InterfaceId};
use std::sync::Arc;

/// Read-only access to stored Wi-Fi credentials.
pub trait CredentialStore: Send + Sync {
    /// First record, in store order, for which `predicate` holds.
    fn lookup(&self, predicate: &dyn Fn(&CredentialRecord) -> bool) -> Option<CredentialRecord>;
}

/// The platform network stack.
#[async_trait]
pub trait NetworkStack: Send + Sync {
    /// Route the stack's raw events to `notifier`.
    ///
    /// Called once by the runtime before any connect request.
    fn attach_notifier(&self, notifier: Arc<dyn EventNotifier>);

    /// The interface connectivity is tracked on, if the stack has one.
    fn default_interface(&self) -> Option<InterfaceId>;

    /// Connect with explicit parameters.
    ///
    /// Returning `Ok` only means the request was accepted; the outcome
    /// arrives later as a link event.
    async fn request_connect(
        &self,
        interface: &InterfaceId,
        request: ConnectRequest,
    ) -> Result<(), ConnectError>;

    /// Connect with the configuration the stack already holds.
    async fn request_connect_stored(&self, interface: &InterfaceId) -> Result<(), ConnectError>;
}

/// An application started once connectivity is established.
#[async_trait]
pub trait ApplicationWorkload: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self);
}
