use std::fmt;

use crate::report::DropCounts;
use crate::source::SourceError;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
	Ingest,
	Normalize,
	Validate,
	Merge,
	Filter,
	Enrich,
	Index,
}

impl fmt::Display for PipelineStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Ingest => "ingest",
			Self::Normalize => "normalize",
			Self::Validate => "validate",
			Self::Merge => "merge",
			Self::Filter => "filter",
			Self::Enrich => "enrich",
			Self::Index => "index",
		})
	}
}

/// A pipeline run that produced no snapshot.
///
/// Individual bad records never end up here; they are dropped and counted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
	#[error("required source failed: {error}")]
	RequiredSource { error: SourceError, drops: DropCounts },
	#[error("no providers left after {stage} ({drops})")]
	NoProviders { stage: PipelineStage, drops: DropCounts },
	#[error("no items left after {stage} ({drops})")]
	NoItems { stage: PipelineStage, drops: DropCounts },
}

impl PipelineError {
	/// Stage at which the run aborted.
	pub fn stage(&self) -> PipelineStage {
		match self {
			Self::RequiredSource { .. } => PipelineStage::Ingest,
			Self::NoProviders { stage, .. } | Self::NoItems { stage, .. } => *stage,
		}
	}

	/// Records dropped before the run aborted.
	pub fn drops(&self) -> DropCounts {
		match self {
			Self::RequiredSource { drops, .. } | Self::NoProviders { drops, .. } | Self::NoItems { drops, .. } => *drops,
		}
	}
}
