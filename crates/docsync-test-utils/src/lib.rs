//! Shared test utilities for the docsync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`failing`]: [`FailingStore`] injects backend errors on chosen operations
//! - [`frozen`]: [`FrozenVersionStore`] violates the version contract on purpose
//! - [`seed`]: store seeding and content assertions, plus [`TestDirs`] for
//!   on-disk scenarios

pub mod failing;
pub mod frozen;
pub mod seed;

pub use failing::{FailingStore, Op};
pub use frozen::FrozenVersionStore;
pub use seed::{TestDirs, assert_absent, assert_content, seed};
