//! Command implementations

pub mod session;
pub mod sync;

pub use sync::{run_plan, run_sync, run_sync_file};
