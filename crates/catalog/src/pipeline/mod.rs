//! End-to-end snapshot build.
//!
//! # Stages
//!
//! ingest → normalize → validate → merge → filter → enrich → index
//!
//! The run is a single-threaded batch. Bad records are dropped and counted in
//! [`DropCounts`]; only a failing required source, or an empty catalog after
//! merge or filter, aborts the run with a [`PipelineError`].

mod error;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use llmdb_primitives::{ProviderId, ProviderRegistry};

pub use self::error::{PipelineError, PipelineStage};
use crate::enrich::{enrich_item, enrich_provider};
use crate::filter::{CompiledFilter, FilterSpec};
use crate::index::CatalogIndex;
use crate::merge::Merger;
use crate::model::{Item, Provider};
use crate::normalize::normalize;
use crate::record::{Record, RecordKind, str_field};
use crate::report::{BuildReport, DropCounts};
use crate::schema::Schema;
use crate::snapshot::{Snapshot, resolve_prefer};
use crate::source::Source;
use crate::validate::{SchemaValidator, ValidationError, Validator, Violation};


/// Settings for one pipeline run.
#[derive(Clone)]
pub struct PipelineOptions {
	pub filter: FilterSpec,
	/// Provider preference order, most preferred first.
	pub prefer: Vec<String>,
	/// Providers a record may name.
	pub registry: ProviderRegistry,
	/// Sources whose failure aborts the run.
	pub required_sources: Vec<String>,
	pub validator: Arc<dyn Validator>,
}

impl Default for PipelineOptions {
	fn default() -> Self {
		Self {
			filter: FilterSpec::allow_all(),
			prefer: Vec::new(),
			registry: ProviderRegistry::builtin(),
			required_sources: Vec::new(),
			validator: Arc::new(SchemaValidator),
		}
	}
}

impl fmt::Debug for PipelineOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PipelineOptions")
			.field("filter", &self.filter)
			.field("prefer", &self.prefer)
			.field("registry", &self.registry.len())
			.field("required_sources", &self.required_sources)
			.finish_non_exhaustive()
	}
}

impl PipelineOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_filter(mut self, filter: FilterSpec) -> Self {
		self.filter = filter;
		self
	}

	pub fn with_prefer<I, S>(mut self, prefer: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.prefer = prefer.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
		self.registry = registry;
		self
	}

	pub fn require_source(mut self, name: impl Into<String>) -> Self {
		self.required_sources.push(name.into());
		self
	}

	pub fn with_required_sources<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.required_sources = names.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
		self.validator = validator;
		self
	}

	fn is_required(&self, source: &str) -> bool {
		self.required_sources.iter().any(|name| name == source)
	}
}

/// Builds a snapshot from `sources`, later sources taking precedence.
pub fn run_pipeline(sources: &[Arc<dyn Source>], options: &PipelineOptions) -> Result<Snapshot, PipelineError> {
	let mut report = BuildReport::default();
	let mut merger = Merger::new();

	for source in sources {
		let set = match source.load() {
			Ok(set) => set,
			Err(error) if options.is_required(source.name()) => {
				tracing::warn!(source = source.name(), %error, "required source failed");
				return Err(PipelineError::RequiredSource {
					error,
					drops: report.drops,
				});
			}
			Err(error) => {
				tracing::warn!(source = source.name(), %error, "source failed; continuing without it");
				report.failed_sources.push(source.name().to_string());
				continue;
			}
		};
		tracing::debug!(
			source = source.name(),
			providers = set.providers.len(),
			items = set.items.len(),
			"ingested source"
		);

		for record in set.providers {
			match check(options, RecordKind::Provider, record) {
				Ok(record) => {
					merger.add_provider(record);
				}
				Err(rejected) => {
					report.drops.invalid_providers += 1;
					report.rejected.push(rejected);
				}
			}
		}
		for record in set.items {
			match check(options, RecordKind::Item, record) {
				Ok(record) => {
					merger.add_item(record);
				}
				Err(rejected) => {
					report.drops.invalid_items += 1;
					report.rejected.push(rejected);
				}
			}
		}
	}
	if !report.rejected.is_empty() {
		let samples: Vec<String> = report.rejected.iter().take(3).map(ToString::to_string).collect();
		tracing::warn!(count = report.rejected.len(), ?samples, "dropped invalid records");
	}

	let merged = merger.finish();
	tracing::debug!(
		providers = merged.providers.len(),
		items = merged.items.len(),
		"merged sources"
	);

	let mut providers: IndexMap<ProviderId, Provider> = IndexMap::with_capacity(merged.providers.len());
	for record in merged.providers {
		match typed(RecordKind::Provider, record, Provider::from_record) {
			Ok(provider) => {
				providers.insert(provider.id.clone(), provider);
			}
			Err(rejected) => {
				report.drops.invalid_providers += 1;
				report.rejected.push(rejected);
			}
		}
	}
	let mut items: Vec<Item> = Vec::with_capacity(merged.items.len());
	for record in merged.items {
		match typed(RecordKind::Item, record, Item::from_record) {
			Ok(item) => items.push(item),
			Err(rejected) => {
				report.drops.invalid_items += 1;
				report.rejected.push(rejected);
			}
		}
	}

	let before = items.len();
	items.retain(|item| providers.contains_key(&item.provider));
	report.drops.orphaned_items = before - items.len();
	if report.drops.orphaned_items > 0 {
		tracing::warn!(count = report.drops.orphaned_items, "dropped items without a provider record");
	}
	ensure_nonempty(PipelineStage::Merge, providers.len(), items.len(), report.drops)?;

	let known: Vec<ProviderId> = providers.keys().cloned().collect();
	let (filter, warnings) = CompiledFilter::compile(&options.filter, &known);
	for warning in &warnings {
		tracing::warn!(%warning, "filter entry ignored");
	}
	report.filter_warnings = warnings;

	let before = providers.len();
	providers.retain(|id, _| filter.admits_provider(id.as_str()));
	report.drops.filtered_providers = before - providers.len();
	let before = items.len();
	items.retain(|item| providers.contains_key(&item.provider) && filter.is_allowed(item.provider.as_str(), &item.id));
	report.drops.filtered_items = before - items.len();
	tracing::debug!(
		providers = providers.len(),
		items = items.len(),
		filtered = report.drops.filtered_items,
		"applied filter"
	);
	ensure_nonempty(PipelineStage::Filter, providers.len(), items.len(), report.drops)?;

	let mut builder = CatalogIndex::builder();
	for (_, mut provider) in providers {
		enrich_provider(&mut provider);
		builder.push_provider(provider);
	}
	builder.extend_items(items.into_iter().map(|mut item| {
		enrich_item(&mut item);
		item
	}));
	let index = builder.build();

	let (prefer, unknown_preferred) = resolve_prefer(&options.prefer, &index);
	report.unknown_preferred = unknown_preferred;

	tracing::debug!(
		providers = index.provider_count(),
		items = index.item_count(),
		collisions = index.collisions().len(),
		dropped = report.drops.total(),
		"built snapshot"
	);
	Ok(Snapshot::new(index, filter, prefer, report))
}

/// Normalize, validate, then check the provider registry.
fn check(options: &PipelineOptions, kind: RecordKind, record: Record) -> Result<Record, ValidationError> {
	let record = normalize(kind, record);
	let id = str_field(&record, "id").map(str::to_string);
	let reject = |violations| ValidationError {
		kind,
		id: id.clone(),
		violations,
	};

	let record = options.validator.validate(Schema::for_kind(kind), record).map_err(reject)?;
	let provider_field = match kind {
		RecordKind::Provider => "id",
		RecordKind::Item => "provider",
	};
	if let Some(provider) = str_field(&record, provider_field).filter(|p| !options.registry.contains(p)) {
		let violation = Violation::UnknownProvider(provider.to_string());
		return Err(reject(vec![violation]));
	}
	Ok(record)
}

/// Converts a merged record into its typed form.
///
/// Merging may combine individually valid partial records into a shape the
/// typed model rejects (for example a fractional token limit), so this is a
/// second rejection point.
fn typed<T>(
	kind: RecordKind,
	record: Record,
	convert: fn(Record) -> Result<T, serde_json::Error>,
) -> Result<T, ValidationError> {
	let id = str_field(&record, "id").map(str::to_string);
	convert(record).map_err(|error| ValidationError {
		kind,
		id,
		violations: vec![Violation::Shape(error.to_string())],
	})
}

pub(crate) fn ensure_nonempty(stage: PipelineStage, providers: usize, items: usize, drops: DropCounts) -> Result<(), PipelineError> {
	if providers == 0 {
		return Err(PipelineError::NoProviders { stage, drops });
	}
	if items == 0 {
		return Err(PipelineError::NoItems { stage, drops });
	}
	Ok(())
}
