//! Serialized snapshot form.
//!
//! The document nests items under their provider so a reader can load one
//! provider's partition without the rest:
//!
//! ```json
//! {
//!   "version": 1,
//!   "generated_at": "2026-01-01T00:00:00Z",
//!   "providers": {
//!     "openai": { "id": "openai", "name": "OpenAI", "items": { "gpt-4": { "id": "gpt-4", "provider": "openai" } } }
//!   }
//! }
//! ```
//!
//! Runtime indexes are never persisted; [`crate::Snapshot::from_document`]
//! rebuilds them on load.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Item, Provider};
use crate::record::RecordSet;

/// Current document format version.
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentError {
	#[error("failed to encode snapshot document: {0}")]
	Encode(String),
	#[error("failed to decode snapshot document: {0}")]
	Decode(String),
	#[error("unsupported snapshot document version {found} (expected {})", DOCUMENT_VERSION)]
	Version { found: u32 },
	#[error("snapshot document entry `{key}` holds record `{id}`")]
	Inconsistent { key: String, id: String },
}

/// A provider record with its items keyed by item id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderEntry {
	#[serde(flatten)]
	pub provider: Provider,
	#[serde(default)]
	pub items: IndexMap<String, Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
	pub version: u32,
	pub generated_at: DateTime<Utc>,
	#[serde(default)]
	pub providers: IndexMap<String, ProviderEntry>,
}

#[derive(Deserialize)]
struct VersionProbe {
	version: u32,
}

impl SnapshotDocument {
	pub fn new(generated_at: DateTime<Utc>) -> Self {
		Self {
			version: DOCUMENT_VERSION,
			generated_at,
			providers: IndexMap::new(),
		}
	}

	pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
		serde_json::to_vec_pretty(self).map_err(|e| DocumentError::Encode(e.to_string()))
	}

	/// Decodes and checks a document.
	///
	/// The version is read before the body so that a document from a newer
	/// format is reported as such rather than as a shape error.
	pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
		let probe: VersionProbe = serde_json::from_slice(bytes).map_err(|e| DocumentError::Decode(e.to_string()))?;
		if probe.version != DOCUMENT_VERSION {
			return Err(DocumentError::Version { found: probe.version });
		}
		let doc: Self = serde_json::from_slice(bytes).map_err(|e| DocumentError::Decode(e.to_string()))?;
		doc.check_keys()?;
		Ok(doc)
	}

	fn check_keys(&self) -> Result<(), DocumentError> {
		for (key, entry) in &self.providers {
			if key != entry.provider.id.as_str() {
				return Err(DocumentError::Inconsistent {
					key: key.clone(),
					id: entry.provider.id.to_string(),
				});
			}
			for (item_key, item) in &entry.items {
				if item_key != &item.id || item.provider != entry.provider.id {
					return Err(DocumentError::Inconsistent {
						key: format!("{key}/{item_key}"),
						id: item.spec(),
					});
				}
			}
		}
		Ok(())
	}

	pub fn item_count(&self) -> usize {
		self.providers.values().map(|entry| entry.items.len()).sum()
	}

	/// Flattens the document back into untyped records.
	pub fn to_records(&self) -> Result<RecordSet, DocumentError> {
		let mut set = RecordSet::new();
		for entry in self.providers.values() {
			set = set.with_provider(to_value(&entry.provider)?);
			for item in entry.items.values() {
				set = set.with_item(to_value(item)?);
			}
		}
		Ok(set)
	}
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, DocumentError> {
	serde_json::to_value(value).map_err(|e| DocumentError::Encode(e.to_string()))
}
