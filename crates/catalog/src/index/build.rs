use std::sync::Arc;

use indexmap::IndexMap;
use llmdb_primitives::ProviderId;
use rustc_hash::{FxHashMap, FxHashSet};

use super::collision::{Collision, CollisionKind};
use super::{CatalogIndex, ProviderItems};
use crate::model::{Item, Provider};

/// Builder for a [`CatalogIndex`].
///
/// Keys bind in two stages. Every canonical id is indexed first, then aliases
/// are bound in item order. An alias that names another item's canonical id,
/// or an alias already claimed by an earlier item, is dropped from the losing
/// item and recorded as a [`Collision`].
#[derive(Debug, Default)]
pub struct IndexBuilder {
	providers: IndexMap<ProviderId, Provider>,
	items: Vec<Item>,
}

impl IndexBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the number of items pushed so far.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Adds a provider. A later provider with the same id replaces the earlier
	/// one in place.
	pub fn push_provider(&mut self, provider: Provider) {
		self.providers.insert(provider.id.clone(), provider);
	}

	pub fn push_item(&mut self, item: Item) {
		self.items.push(item);
	}

	pub fn extend_items<I: IntoIterator<Item = Item>>(&mut self, items: I) {
		self.items.extend(items);
	}

	/// Builds the index.
	///
	/// Items whose provider was never pushed are skipped with a warning.
	pub fn build(self) -> CatalogIndex {
		let mut collisions = Vec::new();
		let mut groups: FxHashMap<ProviderId, Vec<Item>> = FxHashMap::default();
		let mut orphans = 0usize;

		for item in self.items {
			if !self.providers.contains_key(&item.provider) {
				orphans += 1;
				continue;
			}
			groups.entry(item.provider.clone()).or_default().push(item);
		}
		if orphans > 0 {
			tracing::warn!(count = orphans, "skipped items without a provider record");
		}

		let mut providers = IndexMap::with_capacity(self.providers.len());
		let mut items = FxHashMap::default();
		for (id, provider) in self.providers {
			let group = groups.remove(&id).unwrap_or_default();
			items.insert(id.clone(), bind_keys(&id, group, &mut collisions));
			providers.insert(id, Arc::new(provider));
		}

		if !collisions.is_empty() {
			let samples: Vec<String> = collisions.iter().take(3).map(ToString::to_string).collect();
			tracing::warn!(count = collisions.len(), ?samples, "dropped colliding index keys");
		}

		CatalogIndex {
			providers,
			items,
			collisions: collisions.into(),
		}
	}
}

fn bind_keys(provider: &ProviderId, group: Vec<Item>, collisions: &mut Vec<Collision>) -> ProviderItems {
	// Stage A: canonical ids. First occurrence wins.
	let mut by_id: FxHashMap<Box<str>, usize> = FxHashMap::default();
	let mut kept: Vec<Item> = Vec::with_capacity(group.len());
	for item in group {
		if by_id.contains_key(item.id.as_str()) {
			collisions.push(Collision {
				provider: provider.clone(),
				key: item.id.clone(),
				item: item.id.clone(),
				kind: CollisionKind::DuplicateId,
			});
			continue;
		}
		by_id.insert(Box::from(item.id.as_str()), kept.len());
		kept.push(item);
	}

	// Stage B: aliases, in item order.
	let mut by_alias: FxHashMap<Box<str>, usize> = FxHashMap::default();
	for idx in 0..kept.len() {
		let aliases = std::mem::take(&mut kept[idx].aliases);
		let mut seen: FxHashSet<String> = FxHashSet::default();
		let mut retained = Vec::with_capacity(aliases.len());
		for alias in aliases {
			let owner_id = kept[idx].id.as_str();
			if alias == owner_id || !seen.insert(alias.clone()) {
				continue;
			}
			let conflict = match (by_id.get(alias.as_str()), by_alias.get(alias.as_str())) {
				(Some(&owner), _) => Some(CollisionKind::CanonicalId {
					owner: kept[owner].id.clone(),
				}),
				(None, Some(&owner)) => Some(CollisionKind::Alias {
					owner: kept[owner].id.clone(),
				}),
				(None, None) => None,
			};
			match conflict {
				Some(kind) => collisions.push(Collision {
					provider: provider.clone(),
					key: alias,
					item: owner_id.to_string(),
					kind,
				}),
				None => {
					by_alias.insert(Box::from(alias.as_str()), idx);
					retained.push(alias);
				}
			}
		}
		kept[idx].aliases = retained;
	}

	ProviderItems {
		items: kept.into_iter().map(Arc::new).collect(),
		by_id,
		by_alias,
	}
}
