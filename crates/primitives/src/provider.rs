//! Provider identifiers and the build-time allow-list.
//!
//! Provider ids are compared and hashed constantly on the query path, so they
//! are backed by a shared `Arc<str>`. The [`ProviderRegistry`] hands out one
//! canonical instance per id, which keeps clones pointer-cheap across a
//! snapshot.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Providers every registry accepts without extra configuration.
pub const BUILTIN_PROVIDERS: &[&str] = &[
	"alibaba",
	"amazon_bedrock",
	"anthropic",
	"azure",
	"cerebras",
	"cohere",
	"deepseek",
	"fireworks",
	"google",
	"google_vertex",
	"groq",
	"huggingface",
	"mistral",
	"moonshot",
	"ollama",
	"openai",
	"openrouter",
	"perplexity",
	"together",
	"xai",
	"zai",
];

/// Identifier of a provider (e.g. `openai`).
///
/// Equality and hashing are by string content, so a `ProviderId` can be
/// looked up in maps with a plain `&str`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(Arc<str>);

impl ProviderId {
	/// Creates an identifier from the given string, verbatim.
	pub fn new(id: impl AsRef<str>) -> Self {
		Self(Arc::from(id.as_ref()))
	}

	/// Returns the identifier as a string slice.
	#[inline]
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Canonical spelling used for registry membership: trimmed, lower-case.
	pub fn normalize(raw: &str) -> String {
		raw.trim().to_ascii_lowercase()
	}
}

impl Borrow<str> for ProviderId {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl AsRef<str> for ProviderId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl From<&str> for ProviderId {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl fmt::Display for ProviderId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl fmt::Debug for ProviderId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ProviderId({:?})", &*self.0)
	}
}

impl Serialize for ProviderId {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.0)
	}
}

impl<'de> Deserialize<'de> for ProviderId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		Ok(Self(Arc::from(raw)))
	}
}

/// Closed set of provider ids accepted by a catalog build.
///
/// Records naming a provider outside this set are rejected during validation,
/// and spec strings naming one fail to parse.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
	ids: FxHashSet<ProviderId>,
}

impl ProviderRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a registry seeded with [`BUILTIN_PROVIDERS`].
	pub fn builtin() -> Self {
		let mut registry = Self::new();
		registry.extend(BUILTIN_PROVIDERS.iter().copied());
		registry
	}

	/// Registers an id, returning the canonical instance.
	pub fn insert(&mut self, id: &str) -> ProviderId {
		let normalized = ProviderId::normalize(id);
		if let Some(existing) = self.ids.get(normalized.as_str()) {
			return existing.clone();
		}
		let id = ProviderId::new(normalized);
		self.ids.insert(id.clone());
		id
	}

	/// Registers every id in `ids`.
	pub fn extend<'a, I: IntoIterator<Item = &'a str>>(&mut self, ids: I) {
		for id in ids {
			self.insert(id);
		}
	}

	/// Returns the canonical id for `raw`, if registered.
	pub fn resolve(&self, raw: &str) -> Option<ProviderId> {
		self.ids.get(ProviderId::normalize(raw).as_str()).cloned()
	}

	/// Returns true if `raw` names a registered provider.
	pub fn contains(&self, raw: &str) -> bool {
		self.resolve(raw).is_some()
	}

	/// Returns the number of registered providers.
	pub fn len(&self) -> usize {
		self.ids.len()
	}

	/// Returns true if no providers are registered.
	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	/// Returns registered ids in sorted order.
	pub fn ids(&self) -> Vec<ProviderId> {
		let mut ids: Vec<_> = self.ids.iter().cloned().collect();
		ids.sort();
		ids
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_resolve_normalizes_case_and_whitespace() {
		let registry = ProviderRegistry::builtin();
		assert_eq!(registry.resolve(" OpenAI ").as_ref().map(ProviderId::as_str), Some("openai"));
		assert!(registry.resolve("not-a-provider").is_none());
	}

	#[test]
	fn test_insert_returns_shared_instance() {
		let mut registry = ProviderRegistry::new();
		let a = registry.insert("acme");
		let b = registry.insert("ACME");
		assert!(Arc::ptr_eq(&a.0, &b.0));
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn test_serde_is_plain_string() {
		let id = ProviderId::new("anthropic");
		let json = serde_json::to_string(&id).unwrap();
		assert_eq!(json, "\"anthropic\"");
		let back: ProviderId = serde_json::from_str(&json).unwrap();
		assert_eq!(back, id);
	}
}
