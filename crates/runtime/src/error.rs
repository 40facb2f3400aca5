use llmdb_catalog::{DocumentError, PipelineError};
use llmdb_primitives::{ItemRef, SpecError};

use crate::storage::StorageError;

/// A reload produced no new snapshot; the previous one stays current.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReloadError {
	#[error(transparent)]
	Pipeline(#[from] PipelineError),
}

/// Failure to write or restore a persisted snapshot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PersistError {
	#[error("no snapshot storage configured")]
	NoStorage,
	#[error("catalog is not loaded")]
	NotLoaded,
	#[error("no persisted snapshot found")]
	Missing,
	#[error(transparent)]
	Document(#[from] DocumentError),
	/// The restored document leaves no providers or no items.
	#[error("persisted snapshot rejected: {0}")]
	Empty(#[from] PipelineError),
	#[error(transparent)]
	Storage(#[from] StorageError),
}

/// A spec string that names no visible item.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
	#[error(transparent)]
	Spec(#[from] SpecError),
	#[error("no item `{0}` in the catalog")]
	NotFound(ItemRef),
}
