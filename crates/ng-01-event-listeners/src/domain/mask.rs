//! Event category masks.

use bitflags::bitflags;
use shared_types::EventCategory;

bitflags! {
    /// Set of event categories a listener is registered for.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ng_01_event_listeners::EventMask;
    /// use shared_types::EventCategory;
    ///
    /// let mask = EventMask::LINK | EventMask::ADDRESS;
    /// assert!(mask.includes(EventCategory::Address));
    /// assert!(!mask.includes(EventCategory::Multicast));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u32 {
        /// Link connect/disconnect results.
        const LINK = 1 << 0;
        /// IPv4 address add/remove.
        const ADDRESS = 1 << 1;
        /// Multicast group join/leave.
        const MULTICAST = 1 << 2;
    }
}

impl EventMask {
    /// The single-category mask for `category`.
    #[must_use]
    pub fn for_category(category: EventCategory) -> Self {
        match category {
            EventCategory::Link => Self::LINK,
            EventCategory::Address => Self::ADDRESS,
            EventCategory::Multicast => Self::MULTICAST,
        }
    }

    /// Whether events of `category` are selected by this mask.
    #[must_use]
    pub fn includes(&self, category: EventCategory) -> bool {
        self.contains(Self::for_category(category))
    }
}
