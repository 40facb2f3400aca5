#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Serving layer for llmdb catalog snapshots.
//!
//! - [`AtomicStore`]: lock-free `Empty | Loaded(snapshot, generation)` cell.
//! - [`Catalog`]: query API, reload with [`Overrides`], persistence.
//! - [`CapabilityQuery`]: capability predicates with provider preference.

mod catalog;
mod error;
mod select;
mod storage;
mod store;

pub use catalog::{Catalog, OVERRIDES_SOURCE, Overrides};
pub use error::{PersistError, ReloadError, ResolveError};
pub use select::{CapabilityQuery, Selection, select, select_first};
pub use storage::{MemoryStorage, SnapshotStorage, StorageError};
pub use store::{AtomicStore, Loaded};
