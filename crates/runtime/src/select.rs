//! Capability-based item selection.
//!
//! A query is a list of required and forbidden capability predicates, an
//! optional provider preference order and an optional provider scope. Each
//! predicate compares the boolean reading of a dotted path with an expected
//! value; a missing leaf reads as `false`.
//!
//! Results are ordered by provider preference, then by snapshot order:
//! preferred providers come first in the order given, the remaining providers
//! follow in their snapshot order, and items keep their snapshot order within
//! a provider.

use std::sync::Arc;

use llmdb_catalog::{Item, Snapshot};
use llmdb_primitives::{CapabilityPath, ItemRef, ProviderId};

/// Outcome of [`select_first`]. `NoMatch` is an ordinary result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
	Match(ItemRef),
	NoMatch,
}

impl Selection {
	pub fn into_option(self) -> Option<ItemRef> {
		match self {
			Self::Match(item) => Some(item),
			Self::NoMatch => None,
		}
	}

	pub fn is_match(&self) -> bool {
		matches!(self, Self::Match(_))
	}
}

/// Builder for a selection query.
///
/// ```
/// use llmdb_runtime::CapabilityQuery;
///
/// let query = CapabilityQuery::new()
/// 	.require("chat")
/// 	.require("tools.enabled")
/// 	.forbid("reasoning.enabled")
/// 	.prefer(["anthropic", "openai"]);
/// assert_eq!(query.requirements().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CapabilityQuery {
	require: Vec<(CapabilityPath, bool)>,
	forbid: Vec<(CapabilityPath, bool)>,
	prefer: Option<Vec<String>>,
	scope: Option<String>,
}

impl CapabilityQuery {
	pub fn new() -> Self {
		Self::default()
	}

	/// Requires `path` to read `true`.
	pub fn require(self, path: &str) -> Self {
		self.require_eq(path, true)
	}

	/// Requires `path` to read `value`.
	pub fn require_eq(mut self, path: &str, value: bool) -> Self {
		self.require.push((CapabilityPath::new(path), value));
		self
	}

	/// Excludes items where `path` reads `true`.
	pub fn forbid(self, path: &str) -> Self {
		self.forbid_eq(path, true)
	}

	/// Excludes items where `path` reads `value`.
	pub fn forbid_eq(mut self, path: &str, value: bool) -> Self {
		self.forbid.push((CapabilityPath::new(path), value));
		self
	}

	/// Overrides the snapshot's provider preference order for this query.
	pub fn prefer<I, S>(mut self, providers: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.prefer = Some(providers.into_iter().map(Into::into).collect());
		self
	}

	/// Restricts candidates to one provider.
	pub fn scope(mut self, provider: impl Into<String>) -> Self {
		self.scope = Some(provider.into());
		self
	}

	pub fn requirements(&self) -> &[(CapabilityPath, bool)] {
		&self.require
	}

	pub fn exclusions(&self) -> &[(CapabilityPath, bool)] {
		&self.forbid
	}

	/// Returns true if `item` satisfies every requirement and no exclusion.
	pub fn matches(&self, item: &Item) -> bool {
		let caps = &item.capabilities;
		self.require.iter().all(|(path, value)| caps.flag(path) == *value)
			&& !self.forbid.iter().any(|(path, value)| caps.flag(path) == *value)
	}
}

/// Every matching item in preference order.
pub fn select(snapshot: &Snapshot, query: &CapabilityQuery) -> Vec<ItemRef> {
	candidates(snapshot, query).map(|item| item.item_ref()).collect()
}

/// Head of [`select`], or [`Selection::NoMatch`].
pub fn select_first(snapshot: &Snapshot, query: &CapabilityQuery) -> Selection {
	match candidates(snapshot, query).next() {
		Some(item) => Selection::Match(item.item_ref()),
		None => Selection::NoMatch,
	}
}

fn candidates<'a>(snapshot: &'a Snapshot, query: &'a CapabilityQuery) -> impl Iterator<Item = &'a Arc<Item>> + 'a {
	let prefer: Vec<ProviderId> = match &query.prefer {
		Some(names) => names.iter().map(|name| ProviderId::new(ProviderId::normalize(name))).collect(),
		None => snapshot.prefer().to_vec(),
	};
	let scope = query.scope.as_deref().map(ProviderId::normalize);

	let mut providers: Vec<(usize, &ProviderId)> = snapshot
		.providers()
		.map(|provider| &provider.id)
		.filter(|id| scope.as_deref().is_none_or(|scope| id.as_str() == scope))
		.map(|id| {
			let rank = prefer.iter().position(|p| p == id).unwrap_or(prefer.len());
			(rank, id)
		})
		.collect();
	// Stable: unpreferred providers keep snapshot order.
	providers.sort_by_key(|(rank, _)| *rank);

	providers
		.into_iter()
		.flat_map(move |(_, id)| snapshot.index().items_of(id.as_str()))
		.filter(move |item| query.matches(item))
}
