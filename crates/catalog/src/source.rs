//! Source adapters: anything that can produce a [`RecordSet`].

use std::fmt;

use crate::document::{DocumentError, SnapshotDocument};
use crate::record::RecordSet;

/// A source failed to produce its records.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
	#[error("source `{name}` is unavailable: {reason}")]
	Unavailable { name: String, reason: String },
	#[error("source `{name}`: {error}")]
	Document { name: String, error: DocumentError },
}

impl SourceError {
	pub fn unavailable(name: impl Into<String>, reason: impl fmt::Display) -> Self {
		Self::Unavailable {
			name: name.into(),
			reason: reason.to_string(),
		}
	}

	/// Name of the source that failed.
	pub fn name(&self) -> &str {
		match self {
			Self::Unavailable { name, .. } | Self::Document { name, .. } => name,
		}
	}
}

/// One ordered input of the pipeline. Later sources take precedence.
pub trait Source: Send + Sync {
	fn name(&self) -> &str;

	fn load(&self) -> Result<RecordSet, SourceError>;
}

/// In-memory record set.
#[derive(Debug, Clone)]
pub struct StaticSource {
	name: String,
	records: RecordSet,
}

impl StaticSource {
	pub fn new(name: impl Into<String>, records: RecordSet) -> Self {
		Self {
			name: name.into(),
			records,
		}
	}
}

impl Source for StaticSource {
	fn name(&self) -> &str {
		&self.name
	}

	fn load(&self) -> Result<RecordSet, SourceError> {
		Ok(self.records.clone())
	}
}

/// A previously serialized snapshot used as a source.
///
/// Typically the base layer: later sources patch the persisted catalog.
#[derive(Debug, Clone)]
pub struct DocumentSource {
	name: String,
	bytes: Vec<u8>,
}

impl DocumentSource {
	pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
		Self {
			name: name.into(),
			bytes,
		}
	}
}

impl Source for DocumentSource {
	fn name(&self) -> &str {
		&self.name
	}

	fn load(&self) -> Result<RecordSet, SourceError> {
		let wrap = |error| SourceError::Document {
			name: self.name.clone(),
			error,
		};
		SnapshotDocument::from_slice(&self.bytes)
			.and_then(|doc| doc.to_records())
			.map_err(wrap)
	}
}

/// Source backed by a closure, for adapters that fetch on demand.
pub struct FnSource<F> {
	name: String,
	load: F,
}

impl<F> FnSource<F>
where
	F: Fn() -> Result<RecordSet, String> + Send + Sync,
{
	pub fn new(name: impl Into<String>, load: F) -> Self {
		Self { name: name.into(), load }
	}
}

impl<F> Source for FnSource<F>
where
	F: Fn() -> Result<RecordSet, String> + Send + Sync,
{
	fn name(&self) -> &str {
		&self.name
	}

	fn load(&self) -> Result<RecordSet, SourceError> {
		(self.load)().map_err(|reason| SourceError::unavailable(self.name.clone(), reason))
	}
}

impl<F> fmt::Debug for FnSource<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FnSource").field("name", &self.name).finish_non_exhaustive()
	}
}
