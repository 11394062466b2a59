//! Trial record store.
//!
//! The reporting core depends only on the [`TrialStore`] trait. This crate
//! also provides the in-memory implementation used by the CLI and tests, the
//! JSON snapshot format it is persisted in, and the bundled site catalog that
//! resolves trial sites to their region.

pub mod catalog;
pub mod error;
pub mod memory;
pub mod repository;
pub mod seed;
pub mod snapshot;

pub use catalog::{SiteCatalog, SiteEntry};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use repository::TrialStore;
pub use seed::seed_snapshot;
pub use snapshot::{Snapshot, load_snapshot, open_store, save_snapshot, save_store, sha256_hex};
