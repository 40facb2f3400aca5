//! Immutable output of one pipeline run.
//!
//! # Role
//!
//! A [`Snapshot`] bundles the index, the compiled filter, the provider
//! preference order and the build report. It is built wholesale off to the
//! side and never mutated; the runtime replaces it in full.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use llmdb_primitives::ProviderId;

use crate::document::{ProviderEntry, SnapshotDocument};
use crate::filter::{CompiledFilter, FilterSpec};
use crate::index::{CatalogIndex, Collision};
use crate::model::{Item, Provider};
use crate::pipeline::{PipelineError, PipelineStage, ensure_nonempty};
use crate::report::{BuildReport, DropCounts};


/// One fully built generation of the catalog.
#[derive(Debug, Clone)]
pub struct Snapshot {
	index: CatalogIndex,
	filter: Arc<CompiledFilter>,
	prefer: Arc<[ProviderId]>,
	generated_at: DateTime<Utc>,
	report: BuildReport,
}

impl Snapshot {
	pub fn new(index: CatalogIndex, filter: CompiledFilter, prefer: Vec<ProviderId>, report: BuildReport) -> Self {
		Self {
			index,
			filter: Arc::new(filter),
			prefer: prefer.into(),
			generated_at: Utc::now(),
			report,
		}
	}

	/// Rebuilds a snapshot from its serialized form.
	///
	/// `filter` is compiled against the document's providers and applied to its
	/// contents, so a document written under a looser filter is narrowed on
	/// load. Entries of `prefer` naming no provider are reported and skipped.
	///
	/// A document that is empty, or empty once filtered, is rejected the same
	/// way a pipeline run would be.
	pub fn from_document(doc: SnapshotDocument, filter: &FilterSpec, prefer: &[String]) -> Result<Self, PipelineError> {
		ensure_nonempty(
			PipelineStage::Merge,
			doc.providers.len(),
			doc.item_count(),
			DropCounts::default(),
		)?;

		let known: Vec<ProviderId> = doc.providers.values().map(|e| e.provider.id.clone()).collect();
		let (compiled, filter_warnings) = CompiledFilter::compile(filter, &known);
		let mut report = BuildReport {
			filter_warnings,
			..BuildReport::default()
		};

		let mut builder = CatalogIndex::builder();
		for entry in doc.providers.into_values() {
			let ProviderEntry { provider, items } = entry;
			if !compiled.admits_provider(provider.id.as_str()) {
				report.drops.filtered_providers += 1;
				report.drops.filtered_items += items.len();
				continue;
			}
			for item in items.into_values() {
				if compiled.is_allowed(item.provider.as_str(), &item.id) {
					builder.push_item(item);
				} else {
					report.drops.filtered_items += 1;
				}
			}
			builder.push_provider(provider);
		}
		let index = builder.build();
		ensure_nonempty(
			PipelineStage::Filter,
			index.provider_count(),
			index.item_count(),
			report.drops,
		)?;
		let (prefer, unknown_preferred) = resolve_prefer(prefer, &index);
		report.unknown_preferred = unknown_preferred;

		Ok(Self {
			index,
			filter: Arc::new(compiled),
			prefer: prefer.into(),
			generated_at: doc.generated_at,
			report,
		})
	}

	/// Serializes providers and items; indexes are left out.
	pub fn to_document(&self) -> SnapshotDocument {
		let mut doc = SnapshotDocument::new(self.generated_at);
		for provider in self.index.providers() {
			let items = self
				.index
				.items_of(provider.id.as_str())
				.iter()
				.map(|item| (item.id.clone(), Item::clone(item)))
				.collect();
			doc.providers.insert(
				provider.id.to_string(),
				ProviderEntry {
					provider: Provider::clone(provider),
					items,
				},
			);
		}
		doc
	}

	pub fn provider(&self, id: &str) -> Option<&Arc<Provider>> {
		self.index.provider(id)
	}

	pub fn providers(&self) -> impl ExactSizeIterator<Item = &Arc<Provider>> + '_ {
		self.index.providers()
	}

	/// Looks up an item by canonical id or alias.
	pub fn item(&self, provider: &str, key: &str) -> Option<&Arc<Item>> {
		self.index.item(provider, key)
	}

	/// Items of one provider, or of every provider in snapshot order.
	pub fn items(&self, provider: Option<&str>) -> Vec<Arc<Item>> {
		match provider {
			Some(provider) => self.index.items_of(provider).to_vec(),
			None => self.index.items().cloned().collect(),
		}
	}

	/// Allow/deny verdict for `(provider, id)`, independent of presence.
	pub fn is_allowed(&self, provider: &str, id: &str) -> bool {
		self.filter.is_allowed(provider, id)
	}

	pub fn filter(&self) -> &Arc<CompiledFilter> {
		&self.filter
	}

	/// Preferred providers, most preferred first.
	pub fn prefer(&self) -> &[ProviderId] {
		&self.prefer
	}

	pub fn index(&self) -> &CatalogIndex {
		&self.index
	}

	pub fn collisions(&self) -> &[Collision] {
		self.index.collisions()
	}

	pub fn generated_at(&self) -> DateTime<Utc> {
		self.generated_at
	}

	pub fn report(&self) -> &BuildReport {
		&self.report
	}
}

/// Resolves preference names against the providers of `index`.
///
/// Returns the resolved ids in order, without repeats, and the names that
/// matched nothing.
pub(crate) fn resolve_prefer(names: &[String], index: &CatalogIndex) -> (Vec<ProviderId>, Vec<String>) {
	let mut resolved: Vec<ProviderId> = Vec::with_capacity(names.len());
	let mut unknown = Vec::new();
	for name in names {
		match index.provider(&ProviderId::normalize(name)) {
			Some(provider) if !resolved.contains(&provider.id) => resolved.push(provider.id.clone()),
			Some(_) => {}
			None => unknown.push(name.clone()),
		}
	}
	if !unknown.is_empty() {
		tracing::warn!(?unknown, "preference order names unknown providers; ignored");
	}
	(resolved, unknown)
}
