//! Two-store file synchronization for docsync
//!
//! This crate decides, per file, how to reconcile a primary and a secondary
//! store against the snapshot of the last successful synchronization, and
//! carries the decisions out:
//!
//! - **Decision**: a pure function from (primary version, secondary version,
//!   snapshot entry) to a [`SyncAction`]
//! - **Engine**: [`SyncEngine`] lists both stores, decides every name and
//!   executes the actions, updating the [`Snapshot`] as it goes
//! - **Conflicts**: [`PrimaryWins`] keeps the primary's content and preserves
//!   the secondary's under a conflict-copy name on both sides
//! - **Filtering**: [`CandidateFilter`] keeps plugin artifacts out of sync
//!
//! # Architecture
//!
//! ```text
//!                  CLI
//!                   |
//!              docsync-core
//!                   |
//!          +--------+---------+
//!          |                  |
//!     docsync-fs       docsync-content
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docsync_core::{Snapshot, SyncEngine};
//! use docsync_fs::MemoryStore;
//!
//! async fn example() -> docsync_core::Result<()> {
//!     let engine = SyncEngine::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()));
//!     let mut snapshot = Snapshot::new();
//!     let report = engine.run(&mut snapshot).await?;
//!     println!("{} operations", report.operations);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod conflict;
pub mod decision;
pub mod engine;
pub mod error;
pub mod filter;
pub mod snapshot;

pub use config::SyncConfig;
pub use conflict::{ConflictResolver, DEFAULT_CONFLICT_INFIX, PrimaryWins, Resolution, conflict_copy_name};
pub use decision::{SyncAction, decide};
pub use engine::{SyncEngine, SyncReport};
pub use error::{Error, Result, Side};
pub use filter::{CandidateFilter, ExcludePrefixes, PLUG_PREFIX};
pub use snapshot::{Snapshot, SnapshotEntry, SnapshotLock};
