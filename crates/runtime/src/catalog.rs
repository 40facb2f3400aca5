//! Runtime query API.
//!
//! # Role
//!
//! [`Catalog`] owns the ordered sources, the build settings and the
//! [`AtomicStore`]. Queries read whatever snapshot is current; none of them
//! fail on an unloaded catalog, they return empty lists, `None` or
//! [`Selection::NoMatch`] instead.
//!
//! # Reload
//!
//! A reload builds a new snapshot off to the side and publishes it with one
//! swap. If the build fails, the store and the settings are left untouched.
//! [`Overrides`] passed to a successful reload become the catalog's settings
//! for later reloads.

use std::fmt;
use std::sync::Arc;

use llmdb_catalog::{
	FilterSpec, Item, PipelineOptions, Provider, RecordSet, Snapshot, SnapshotDocument, Source, StaticSource,
	run_pipeline,
};
use llmdb_primitives::{ItemRef, ProviderId, ProviderRegistry, SpecError};
use parking_lot::Mutex;

use crate::error::{PersistError, ReloadError, ResolveError};
use crate::select::{CapabilityQuery, Selection, select, select_first};
use crate::storage::SnapshotStorage;
use crate::store::AtomicStore;

/// Name of the source that carries override records.
pub const OVERRIDES_SOURCE: &str = "overrides";

/// Runtime adjustments applied by [`Catalog::reload`].
#[derive(Debug, Clone, Default)]
pub struct Overrides {
	/// Replaces the allow/deny filter.
	pub filter: Option<FilterSpec>,
	/// Replaces the provider preference order.
	pub prefer: Option<Vec<String>>,
	/// Record set merged after every configured source.
	pub records: Option<RecordSet>,
}

impl Overrides {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn filter(mut self, filter: FilterSpec) -> Self {
		self.filter = Some(filter);
		self
	}

	pub fn prefer<I, S>(mut self, prefer: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.prefer = Some(prefer.into_iter().map(Into::into).collect());
		self
	}

	pub fn records(mut self, records: RecordSet) -> Self {
		self.records = Some(records);
		self
	}
}

#[derive(Debug, Clone, Default)]
struct Settings {
	options: PipelineOptions,
	overlay: Option<RecordSet>,
}

impl Settings {
	fn apply(&self, overrides: Option<Overrides>) -> Self {
		let mut next = self.clone();
		if let Some(overrides) = overrides {
			if let Some(filter) = overrides.filter {
				next.options.filter = filter;
			}
			if let Some(prefer) = overrides.prefer {
				next.options.prefer = prefer;
			}
			if let Some(records) = overrides.records {
				next.overlay = Some(records);
			}
		}
		next
	}
}

/// Concurrent, read-optimized catalog handle.
pub struct Catalog {
	store: AtomicStore,
	sources: Vec<Arc<dyn Source>>,
	settings: Mutex<Settings>,
	/// Fixed at construction; overrides never change it.
	registry: ProviderRegistry,
	storage: Option<Arc<dyn SnapshotStorage>>,
}

impl fmt::Debug for Catalog {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let sources: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
		f.debug_struct("Catalog")
			.field("generation", &self.store.generation())
			.field("sources", &sources)
			.field("storage", &self.storage.is_some())
			.finish_non_exhaustive()
	}
}

impl Catalog {
	/// Creates an unloaded catalog over `sources`, lowest precedence first.
	pub fn new(sources: Vec<Arc<dyn Source>>, options: PipelineOptions) -> Self {
		Self {
			store: AtomicStore::new(),
			sources,
			registry: options.registry.clone(),
			settings: Mutex::new(Settings { options, overlay: None }),
			storage: None,
		}
	}

	pub fn with_storage(mut self, storage: Arc<dyn SnapshotStorage>) -> Self {
		self.storage = Some(storage);
		self
	}

	/// Builds and publishes the first snapshot. Same as `reload(None)`.
	pub fn load(&self) -> Result<u64, ReloadError> {
		self.reload(None)
	}

	/// Rebuilds from all sources and publishes the result.
	///
	/// Returns the new generation. On error the current snapshot stays.
	pub fn reload(&self, overrides: Option<Overrides>) -> Result<u64, ReloadError> {
		let next = self.settings.lock().apply(overrides);

		let mut sources = self.sources.clone();
		if let Some(overlay) = &next.overlay {
			sources.push(Arc::new(StaticSource::new(OVERRIDES_SOURCE, overlay.clone())));
		}
		let snapshot = match run_pipeline(&sources, &next.options) {
			Ok(snapshot) => snapshot,
			Err(error) => {
				tracing::warn!(
					%error,
					stage = %error.stage(),
					generation = self.store.generation(),
					"reload failed; keeping current snapshot"
				);
				return Err(error.into());
			}
		};

		let mut settings = self.settings.lock();
		let generation = self.publish(snapshot);
		*settings = next;
		Ok(generation)
	}

	fn publish(&self, snapshot: Snapshot) -> u64 {
		let (providers, items) = (snapshot.index().provider_count(), snapshot.index().item_count());
		let generation = self.store.put(snapshot);
		tracing::info!(generation, providers, items, "published catalog snapshot");
		generation
	}

	/// Looks up an item by canonical id or alias.
	pub fn get(&self, provider: &str, id: &str) -> Option<Arc<Item>> {
		self.store.snapshot()?.item(&ProviderId::normalize(provider), id).cloned()
	}

	/// Items of `provider`, or every item when `None`.
	pub fn list(&self, provider: Option<&str>) -> Vec<Arc<Item>> {
		let provider = provider.map(ProviderId::normalize);
		self.store
			.snapshot()
			.map(|s| s.items(provider.as_deref()))
			.unwrap_or_default()
	}

	pub fn list_providers(&self) -> Vec<Arc<Provider>> {
		self.store
			.snapshot()
			.map(|s| s.providers().cloned().collect())
			.unwrap_or_default()
	}

	pub fn provider(&self, id: &str) -> Option<Arc<Provider>> {
		self.store.snapshot()?.provider(&ProviderId::normalize(id)).cloned()
	}

	/// Filter verdict for `(provider, id)`; `false` while unloaded.
	pub fn is_allowed(&self, provider: &str, id: &str) -> bool {
		let provider = ProviderId::normalize(provider);
		self.store.snapshot().is_some_and(|s| s.is_allowed(&provider, id))
	}

	pub fn select(&self, query: &CapabilityQuery) -> Vec<ItemRef> {
		self.store.snapshot().map(|s| select(&s, query)).unwrap_or_default()
	}

	pub fn select_first(&self, query: &CapabilityQuery) -> Selection {
		match self.store.snapshot() {
			Some(snapshot) => select_first(&snapshot, query),
			None => Selection::NoMatch,
		}
	}

	/// Generation of the current snapshot, `0` while unloaded.
	pub fn current_generation(&self) -> u64 {
		self.store.generation()
	}

	pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
		self.store.snapshot()
	}

	pub fn is_loaded(&self) -> bool {
		self.store.is_loaded()
	}

	/// Drops the current snapshot. Queries behave as unloaded until the next
	/// successful reload.
	pub fn clear(&self) {
		if let Some(previous) = self.store.clear() {
			tracing::info!(generation = previous.generation(), "cleared catalog snapshot");
		}
	}

	/// Parses `"<provider>:<item>"` against the registered providers.
	pub fn parse_spec(&self, spec: &str) -> Result<ItemRef, SpecError> {
		ItemRef::parse(spec, &self.registry)
	}

	/// Parses `spec` and looks the item up, following aliases.
	pub fn resolve_spec(&self, spec: &str) -> Result<Arc<Item>, ResolveError> {
		let item_ref = self.parse_spec(spec)?;
		self.get(item_ref.provider.as_str(), &item_ref.item)
			.ok_or(ResolveError::NotFound(item_ref))
	}

	/// Writes the current snapshot to the configured storage.
	pub fn persist(&self) -> Result<(), PersistError> {
		let storage = self.storage.as_ref().ok_or(PersistError::NoStorage)?;
		let snapshot = self.store.snapshot().ok_or(PersistError::NotLoaded)?;
		let bytes = snapshot.to_document().to_bytes()?;
		storage.save_bytes(&bytes)?;
		tracing::debug!(bytes = bytes.len(), "persisted catalog snapshot");
		Ok(())
	}

	/// Publishes the persisted snapshot without running the pipeline.
	///
	/// The current filter and preference order are applied to the restored
	/// contents. A document with nothing left to serve is rejected and the
	/// current snapshot stays.
	pub fn load_persisted(&self) -> Result<u64, PersistError> {
		let storage = self.storage.as_ref().ok_or(PersistError::NoStorage)?;
		let bytes = storage.load_bytes()?.ok_or(PersistError::Missing)?;
		let doc = SnapshotDocument::from_slice(&bytes)?;

		let (filter, prefer) = {
			let settings = self.settings.lock();
			(settings.options.filter.clone(), settings.options.prefer.clone())
		};
		let snapshot = Snapshot::from_document(doc, &filter, &prefer)?;
		Ok(self.publish(snapshot))
	}
}
