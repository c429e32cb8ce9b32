//! File store abstraction for docsync
//!
//! Defines the [`FileStore`] contract the sync engine consumes, the metadata
//! types flowing through it, and two reference backends:
//!
//! - [`MemoryStore`]: shared in-memory store with a change feed
//! - [`DiskStore`]: a directory on the local filesystem with atomic writes

pub mod config;
pub mod disk;
pub mod error;
pub mod io;
pub mod memory;
pub mod meta;
pub mod path;
pub mod store;

pub use config::ConfigStore;
pub use disk::DiskStore;
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use meta::{FileMeta, Perm, Version, WriteOptions};
pub use path::{NormalizedPath, validate_store_name};
pub use store::{FileStore, StoreEvent};
