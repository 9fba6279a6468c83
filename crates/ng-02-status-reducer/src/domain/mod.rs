//! Domain layer for the status reducer.

mod gate;
mod reduction;

pub use gate::Gate;
pub use reduction::{reduce, Reduction};
