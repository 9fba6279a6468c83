//! Service layer for the status reducer.

mod context;
mod reducer;

pub use context::ConnectivityContext;
pub use reducer::StatusReducer;
