//! Alias collision vocabulary.

use std::fmt;

use llmdb_primitives::ProviderId;

/// Which key an incoming binding conflicted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollisionKind {
	/// Another item in the same provider has this string as its canonical id.
	CanonicalId { owner: String },
	/// An earlier item in the same provider already claimed this alias.
	Alias { owner: String },
	/// A second item arrived with an already-indexed canonical id.
	DuplicateId,
}

/// A key dropped while building the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
	pub provider: ProviderId,
	/// The conflicting key: an alias, or a canonical id for [`CollisionKind::DuplicateId`].
	pub key: String,
	/// Canonical id of the item that lost the key.
	pub item: String,
	pub kind: CollisionKind,
}

impl fmt::Display for Collision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let Self {
			provider,
			key,
			item,
			kind,
		} = self;
		match kind {
			CollisionKind::CanonicalId { owner } => {
				write!(f, "{provider}: alias `{key}` of `{item}` shadows canonical id of `{owner}`")
			}
			CollisionKind::Alias { owner } => {
				write!(f, "{provider}: alias `{key}` of `{item}` already bound to `{owner}`")
			}
			CollisionKind::DuplicateId => write!(f, "{provider}: duplicate item id `{key}`"),
		}
	}
}
