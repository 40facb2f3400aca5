//! `"<provider>:<item>"` spec strings.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ProviderId, ProviderRegistry};

/// Errors produced while parsing a spec string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
	/// No colon, or an empty provider or item segment.
	#[error("invalid item spec {0:?}: expected \"<provider>:<item>\"")]
	InvalidFormat(String),
	/// The provider segment does not name a known provider.
	#[error("unknown provider {0:?}")]
	UnknownProvider(String),
}

/// A `(provider, item)` pair naming one catalog entry.
///
/// Parsing only checks the provider; the item id is not validated against any
/// catalog and may be an alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
	pub provider: ProviderId,
	pub item: String,
}

impl ItemRef {
	pub fn new(provider: ProviderId, item: impl Into<String>) -> Self {
		Self {
			provider,
			item: item.into(),
		}
	}

	/// Parses `spec` against a provider registry.
	pub fn parse(spec: &str, registry: &ProviderRegistry) -> Result<Self, SpecError> {
		Self::parse_with(spec, |raw| registry.resolve(raw))
	}

	/// Parses `spec`, recognizing providers through `lookup`.
	///
	/// Splits on the first colon only, so item ids may themselves contain
	/// colons (`bedrock:anthropic.claude-v2:1`).
	pub fn parse_with<F>(spec: &str, lookup: F) -> Result<Self, SpecError>
	where
		F: FnOnce(&str) -> Option<ProviderId>,
	{
		let Some((provider, item)) = spec.split_once(':') else {
			return Err(SpecError::InvalidFormat(spec.to_string()));
		};
		let (provider, item) = (provider.trim(), item.trim());
		if provider.is_empty() || item.is_empty() {
			return Err(SpecError::InvalidFormat(spec.to_string()));
		}
		let provider = lookup(provider).ok_or_else(|| SpecError::UnknownProvider(provider.to_string()))?;
		Ok(Self::new(provider, item))
	}
}

impl fmt::Display for ItemRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.provider, self.item)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn registry() -> ProviderRegistry {
		ProviderRegistry::builtin()
	}

	#[test]
	fn test_parse_splits_on_first_colon() {
		let parsed = ItemRef::parse("amazon_bedrock:anthropic.claude-v2:1", &registry()).unwrap();
		assert_eq!(parsed.provider.as_str(), "amazon_bedrock");
		assert_eq!(parsed.item, "anthropic.claude-v2:1");
	}

	#[test]
	fn test_parse_without_colon_is_invalid_format() {
		assert_eq!(
			ItemRef::parse("gpt-4", &registry()),
			Err(SpecError::InvalidFormat("gpt-4".into()))
		);
	}

	#[test]
	fn test_parse_empty_segments_are_invalid_format() {
		assert!(matches!(ItemRef::parse(":gpt-4", &registry()), Err(SpecError::InvalidFormat(_))));
		assert!(matches!(ItemRef::parse("openai:", &registry()), Err(SpecError::InvalidFormat(_))));
	}

	#[test]
	fn test_parse_unknown_provider() {
		assert_eq!(
			ItemRef::parse("nope:model", &registry()),
			Err(SpecError::UnknownProvider("nope".into()))
		);
	}

	#[test]
	fn test_display_round_trips_spec_form() {
		let parsed = ItemRef::parse("OpenAI:gpt-4o", &registry()).unwrap();
		assert_eq!(parsed.to_string(), "openai:gpt-4o");
	}
}
