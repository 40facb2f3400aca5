//! Build diagnostics carried alongside a snapshot.

use std::fmt;

use crate::filter::FilterWarning;
use crate::validate::ValidationError;

/// Records dropped by the pipeline, per reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropCounts {
	pub invalid_providers: usize,
	pub invalid_items: usize,
	/// Items whose provider has no surviving provider record.
	pub orphaned_items: usize,
	/// Items hidden by the allow/deny filter, including those of hidden providers.
	pub filtered_items: usize,
	pub filtered_providers: usize,
}

impl DropCounts {
	pub fn total(&self) -> usize {
		self.invalid_providers + self.invalid_items + self.orphaned_items + self.filtered_items + self.filtered_providers
	}
}

impl fmt::Display for DropCounts {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} invalid providers, {} invalid items, {} orphaned items, {} filtered providers, {} filtered items",
			self.invalid_providers, self.invalid_items, self.orphaned_items, self.filtered_providers, self.filtered_items
		)
	}
}

/// Non-fatal outcomes of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
	pub drops: DropCounts,
	/// Every record rejected by validation, in ingest order.
	pub rejected: Vec<ValidationError>,
	pub filter_warnings: Vec<FilterWarning>,
	/// Names of non-required sources that failed to load.
	pub failed_sources: Vec<String>,
	/// Entries of the preference order that name no surviving provider.
	pub unknown_preferred: Vec<String>,
}
