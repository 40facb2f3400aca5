//! Nested capability tree with dotted-path lookup.

use std::collections::BTreeMap;

use llmdb_primitives::CapabilityPath;
use serde::{Deserialize, Serialize};

/// One node of a capability tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityValue {
	Flag(bool),
	Number(f64),
	Tree(Capabilities),
}

impl CapabilityValue {
	/// Boolean reading of a node.
	///
	/// Numbers are true when non-zero. A subtree reads as its `enabled` leaf,
	/// so `tools: true` and `tools.enabled: true` mean the same thing.
	pub fn truthy(&self) -> bool {
		match self {
			Self::Flag(b) => *b,
			Self::Number(n) => *n != 0.0,
			Self::Tree(tree) => tree.get("enabled").is_some_and(CapabilityValue::truthy),
		}
	}
}

/// Capability flags of an item (`chat`, `tools.enabled`, `json.native`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(BTreeMap<String, CapabilityValue>);

impl Capabilities {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<&CapabilityValue> {
		self.0.get(key)
	}

	/// Resolves a dotted path to a node, if present.
	pub fn resolve(&self, path: &CapabilityPath) -> Option<&CapabilityValue> {
		let mut segments = path.segments();
		let mut node = self.0.get(segments.next()?)?;
		for segment in segments {
			match node {
				CapabilityValue::Tree(tree) => node = tree.0.get(segment)?,
				_ => return None,
			}
		}
		Some(node)
	}

	/// Boolean reading of `path`; a missing node reads as `false`.
	pub fn flag(&self, path: &CapabilityPath) -> bool {
		self.resolve(path).is_some_and(CapabilityValue::truthy)
	}

	/// Sets `path` to `value` unless a leaf is already there.
	///
	/// A scalar standing where a subtree is needed is expanded into
	/// `{ enabled: <scalar> }` first, so `tools: true` plus a default for
	/// `tools.streaming` becomes `{ enabled: true, streaming: false }`.
	pub fn set_default(&mut self, path: &CapabilityPath, value: bool) {
		let segments: Vec<&str> = path.segments().collect();
		let Some((leaf, parents)) = segments.split_last() else {
			return;
		};
		let mut tree = self;
		for parent in parents {
			let node = tree
				.0
				.entry((*parent).to_string())
				.or_insert_with(|| CapabilityValue::Tree(Capabilities::new()));
			if !matches!(node, CapabilityValue::Tree(_)) {
				let scalar = std::mem::replace(node, CapabilityValue::Tree(Capabilities::new()));
				if let CapabilityValue::Tree(expanded) = node {
					expanded.0.insert("enabled".to_string(), scalar);
				}
			}
			match node {
				CapabilityValue::Tree(next) => tree = next,
				_ => return,
			}
		}
		tree.0.entry((*leaf).to_string()).or_insert(CapabilityValue::Flag(value));
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &CapabilityValue)> + '_ {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl FromIterator<(String, CapabilityValue)> for Capabilities {
	fn from_iter<I: IntoIterator<Item = (String, CapabilityValue)>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}
