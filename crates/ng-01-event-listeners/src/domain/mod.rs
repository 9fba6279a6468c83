//! Domain Layer
//!
//! Pure registration logic with no I/O.

mod mask;
mod registration;

pub use mask::EventMask;
pub use registration::{ListenerId, ListenerRegistration};
