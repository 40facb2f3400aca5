//! Persistence seam for serialized snapshots.
//!
//! The runtime only moves opaque bytes through this trait; the encoding is
//! [`llmdb_catalog::SnapshotDocument`].

use parking_lot::Mutex;

/// A storage backend failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("snapshot storage failed: {0}")]
pub struct StorageError(pub String);

pub trait SnapshotStorage: Send + Sync {
	/// Returns the stored bytes, or `None` if nothing was saved yet.
	fn load_bytes(&self) -> Result<Option<Vec<u8>>, StorageError>;

	fn save_bytes(&self, bytes: &[u8]) -> Result<(), StorageError>;
}

/// In-process storage, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStorage {
	bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_bytes(bytes: Vec<u8>) -> Self {
		Self {
			bytes: Mutex::new(Some(bytes)),
		}
	}
}

impl SnapshotStorage for MemoryStorage {
	fn load_bytes(&self) -> Result<Option<Vec<u8>>, StorageError> {
		Ok(self.bytes.lock().clone())
	}

	fn save_bytes(&self, bytes: &[u8]) -> Result<(), StorageError> {
		*self.bytes.lock() = Some(bytes.to_vec());
		Ok(())
	}
}
