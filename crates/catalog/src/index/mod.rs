//! Lookup structures over the filtered, enriched record set.
//!
//! # Role
//!
//! [`CatalogIndex`] owns every provider and item of one snapshot and answers
//! the point lookups the runtime serves:
//!
//! - providers by id, in first-seen order
//! - items by `(provider, id)`
//! - items grouped by provider, in snapshot order
//! - `(provider, alias)` to canonical id
//!
//! # Invariants
//!
//! - Within a provider, canonical ids and aliases share one key space: an alias
//!   never shadows a canonical id and is bound to at most one item.
//! - Resolving an alias and then resolving the resulting id yields the same
//!   item.
//! - Dropped keys are recorded in [`CatalogIndex::collisions`].

mod build;
mod collision;

use std::sync::Arc;

use indexmap::IndexMap;
use llmdb_primitives::ProviderId;
use rustc_hash::FxHashMap;

pub use self::build::IndexBuilder;
pub use self::collision::{Collision, CollisionKind};
use crate::model::{Item, Provider};

#[cfg(test)]
mod tests;

/// Items of one provider with their key tables.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProviderItems {
	items: Vec<Arc<Item>>,
	by_id: FxHashMap<Box<str>, usize>,
	by_alias: FxHashMap<Box<str>, usize>,
}

impl ProviderItems {
	fn get(&self, key: &str) -> Option<&Arc<Item>> {
		let idx = self.by_id.get(key).or_else(|| self.by_alias.get(key))?;
		self.items.get(*idx)
	}
}

/// Immutable index over one generation of the catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
	providers: IndexMap<ProviderId, Arc<Provider>>,
	items: FxHashMap<ProviderId, ProviderItems>,
	collisions: Arc<[Collision]>,
}

impl CatalogIndex {
	pub fn builder() -> IndexBuilder {
		IndexBuilder::new()
	}

	pub fn provider(&self, id: &str) -> Option<&Arc<Provider>> {
		self.providers.get(id)
	}

	/// Providers in first-seen order.
	pub fn providers(&self) -> impl ExactSizeIterator<Item = &Arc<Provider>> + '_ {
		self.providers.values()
	}

	/// Looks up an item by canonical id only.
	pub fn item_by_id(&self, provider: &str, id: &str) -> Option<&Arc<Item>> {
		let group = self.items.get(provider)?;
		group.items.get(*group.by_id.get(id)?)
	}

	/// Looks up an item by canonical id, falling back to its aliases.
	pub fn item(&self, provider: &str, key: &str) -> Option<&Arc<Item>> {
		self.items.get(provider)?.get(key)
	}

	/// Returns the canonical id bound to `alias`, if any.
	pub fn resolve_alias(&self, provider: &str, alias: &str) -> Option<&str> {
		let group = self.items.get(provider)?;
		let idx = *group.by_alias.get(alias)?;
		group.items.get(idx).map(|item| item.id.as_str())
	}

	/// Items of one provider in snapshot order; empty if unknown.
	pub fn items_of(&self, provider: &str) -> &[Arc<Item>] {
		self.items.get(provider).map(|group| group.items.as_slice()).unwrap_or_default()
	}

	/// Every item, grouped by provider in provider order.
	pub fn items(&self) -> impl Iterator<Item = &Arc<Item>> + '_ {
		self.providers.keys().flat_map(|id| self.items_of(id.as_str()))
	}

	pub fn provider_count(&self) -> usize {
		self.providers.len()
	}

	pub fn item_count(&self) -> usize {
		self.items.values().map(|group| group.items.len()).sum()
	}

	pub fn collisions(&self) -> &[Collision] {
		&self.collisions
	}
}
