//! Multicast Membership Manager
//!
//! Owns the (interface, group) membership table. Membership changes are
//! reported through the shared `EventNotifier`, so the status reducer sees
//! them like any other raw event.

use crate::domain::{MembershipKey, MembershipState};
use crate::error::MulticastError;
use crate::ports::MulticastBackend;
use parking_lot::Mutex;
use shared_types::{EventNotifier, InterfaceId, NetworkEvent};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{info, warn};

pub struct MulticastMembershipManager {
    backend: Arc<dyn MulticastBackend>,
    notifier: Arc<dyn EventNotifier>,
    memberships: Mutex<BTreeMap<MembershipKey, MembershipState>>,
}

impl MulticastMembershipManager {
    pub fn new(backend: Arc<dyn MulticastBackend>, notifier: Arc<dyn EventNotifier>) -> Self {
        Self {
            backend,
            notifier,
            memberships: Mutex::new(BTreeMap::new()),
        }
    }

    /// Join `group` on `interface`.
    ///
    /// # Errors
    ///
    /// - `InvalidGroup` for a non-multicast address
    /// - `AlreadyJoined` when already a member; nothing changes
    /// - `OutOfResources` when the backend has no slot left
    pub async fn join(&self, interface: &InterfaceId, group: Ipv4Addr) -> Result<(), MulticastError> {
        if !group.is_multicast() {
            return Err(MulticastError::InvalidGroup(group));
        }

        let key = MembershipKey::new(interface.clone(), group);
        {
            let mut memberships = self.memberships.lock();
            if memberships.get(&key).is_some_and(MembershipState::is_member) {
                return Err(MulticastError::AlreadyJoined {
                    interface: interface.clone(),
                    group,
                });
            }

            let handle = self.backend.attach(interface, group).map_err(|e| {
                warn!(interface = %interface, %group, error = %e, "[ng-03] Group attach failed");
                e
            })?;
            self.backend.set_monitor(interface, true);
            memberships.insert(key, MembershipState::Member(handle));
        }

        info!(interface = %interface, %group, "[ng-03] Joined multicast group");
        self.notifier
            .notify(interface, NetworkEvent::MulticastChange { joined: true, group })
            .await;
        Ok(())
    }

    /// Leave `group` on `interface`.
    ///
    /// The monitor is switched off once the interface has no groups left.
    ///
    /// # Errors
    ///
    /// - `NotFound` when not a member
    /// - `ReleaseFailed` when the backend refuses; membership is kept
    pub async fn leave(&self, interface: &InterfaceId, group: Ipv4Addr) -> Result<(), MulticastError> {
        let key = MembershipKey::new(interface.clone(), group);
        {
            let mut memberships = self.memberships.lock();
            let Some(MembershipState::Member(handle)) = memberships.get(&key).copied() else {
                return Err(MulticastError::NotFound {
                    interface: interface.clone(),
                    group,
                });
            };

            self.backend.release(interface, group, handle)?;
            memberships.insert(key, MembershipState::NotMember);

            let still_joined = memberships
                .iter()
                .any(|(k, state)| k.interface == *interface && state.is_member());
            if !still_joined {
                self.backend.set_monitor(interface, false);
            }
        }

        info!(interface = %interface, %group, "[ng-03] Left multicast group");
        self.notifier
            .notify(interface, NetworkEvent::MulticastChange { joined: false, group })
            .await;
        Ok(())
    }

    #[must_use]
    pub fn is_member(&self, interface: &InterfaceId, group: Ipv4Addr) -> bool {
        self.memberships
            .lock()
            .get(&MembershipKey::new(interface.clone(), group))
            .is_some_and(MembershipState::is_member)
    }

    /// Current memberships, ordered by interface then group.
    #[must_use]
    pub fn memberships(&self) -> Vec<MembershipKey> {
        self.memberships
            .lock()
            .iter()
            .filter(|(_, state)| state.is_member())
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryMulticastBackend;
    use crate::domain::SSDP_GROUP;
    use async_trait::async_trait;

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<(InterfaceId, NetworkEvent)>>,
    }

    #[async_trait]
    impl EventNotifier for RecordingNotifier {
        async fn notify(&self, interface: &InterfaceId, event: NetworkEvent) -> usize {
            self.events.lock().push((interface.clone(), event));
            1
        }
    }

    fn manager(
        slots: usize,
    ) -> (
        MulticastMembershipManager,
        Arc<InMemoryMulticastBackend>,
        Arc<RecordingNotifier>,
    ) {
        let backend = Arc::new(InMemoryMulticastBackend::with_slots(slots));
        let notifier = Arc::new(RecordingNotifier::default());
        (
            MulticastMembershipManager::new(backend.clone(), notifier.clone()),
            backend,
            notifier,
        )
    }

    #[tokio::test]
    async fn test_join_twice_is_already_joined() {
        let (manager, backend, notifier) = manager(4);
        let eth0 = InterfaceId::from("eth0");

        manager.join(&eth0, SSDP_GROUP).await.unwrap();
        let err = manager.join(&eth0, SSDP_GROUP).await.unwrap_err();

        assert!(matches!(err, MulticastError::AlreadyJoined { .. }));
        assert!(!err.is_fatal());
        assert!(manager.is_member(&eth0, SSDP_GROUP));
        assert_eq!(backend.attached(&eth0), 1);

        let events = notifier.events.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].1,
            NetworkEvent::MulticastChange {
                joined: true,
                group: SSDP_GROUP
            }
        );
    }

    #[tokio::test]
    async fn test_leave_when_not_member() {
        let (manager, _backend, notifier) = manager(4);
        let err = manager.leave(&"eth0".into(), SSDP_GROUP).await.unwrap_err();
        assert!(matches!(err, MulticastError::NotFound { .. }));
        assert!(notifier.events.lock().is_empty());
    }

    #[tokio::test]
    async fn test_join_leave_cycle() {
        let (manager, backend, notifier) = manager(4);
        let eth0 = InterfaceId::from("eth0");

        manager.join(&eth0, SSDP_GROUP).await.unwrap();
        assert!(backend.is_monitored(&eth0));

        manager.leave(&eth0, SSDP_GROUP).await.unwrap();
        assert!(!manager.is_member(&eth0, SSDP_GROUP));
        assert!(!backend.is_monitored(&eth0));
        assert_eq!(backend.attached(&eth0), 0);
        assert!(manager.memberships().is_empty());

        // Joining again after leaving is allowed
        manager.join(&eth0, SSDP_GROUP).await.unwrap();
        assert_eq!(notifier.events.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_monitor_stays_on_while_other_groups_joined() {
        let (manager, backend, _notifier) = manager(4);
        let eth0 = InterfaceId::from("eth0");
        let other = Ipv4Addr::new(224, 0, 0, 251);

        manager.join(&eth0, SSDP_GROUP).await.unwrap();
        manager.join(&eth0, other).await.unwrap();
        manager.leave(&eth0, SSDP_GROUP).await.unwrap();

        assert!(backend.is_monitored(&eth0));
        assert_eq!(
            manager.memberships(),
            vec![MembershipKey::new(eth0, other)]
        );
    }

    #[tokio::test]
    async fn test_out_of_resources_leaves_state_unchanged() {
        let (manager, _backend, notifier) = manager(0);
        let eth0 = InterfaceId::from("eth0");

        let err = manager.join(&eth0, SSDP_GROUP).await.unwrap_err();
        assert!(err.is_fatal());
        assert!(!manager.is_member(&eth0, SSDP_GROUP));
        assert!(notifier.events.lock().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_group_rejected() {
        let (manager, _backend, _notifier) = manager(4);
        let err = manager
            .join(&"eth0".into(), Ipv4Addr::new(192, 168, 1, 1))
            .await
            .unwrap_err();
        assert_eq!(err, MulticastError::InvalidGroup(Ipv4Addr::new(192, 168, 1, 1)));
    }
}
