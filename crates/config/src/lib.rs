//! TOML configuration for catalog builds.
//!
//! ```toml
//! prefer = ["anthropic", "openai"]
//! required_sources = ["bundled"]
//!
//! [providers]
//! known = ["my-gateway"]
//!
//! [filter.allow]
//! anthropic = "all"
//! openai = ["gpt-4o*", "o1", { regex = "^o[0-9]+-mini$" }]
//!
//! [filter.deny]
//! openai = ["*-preview"]
//! ```
//!
//! - `filter.allow` is `"all"` or a table of provider to `"all"` or a pattern
//!   list. A top-level `allow` is accepted as shorthand and is used only when
//!   `filter.allow` is absent. Omitting both admits everything.
//! - A string pattern containing `*` is a glob, anything else an exact id.
//! - `providers.known` extends the built-in provider registry.
//! - Entries naming providers outside the registry are warned about, not
//!   rejected; the filter compiler drops them again if no record for that
//!   provider survives.

mod error;

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use llmdb_catalog::{AllowSpec, FilterSpec, Pattern, PatternSet, PipelineOptions};
use llmdb_primitives::ProviderRegistry;
use regex::Regex;
use serde::de::{self, Deserializer, Unexpected};
use serde::Deserialize;

pub use error::{ConfigError, Result};

#[cfg(test)]
mod tests;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
	/// Provider preference order, most preferred first.
	pub prefer: Vec<String>,
	/// Sources whose failure aborts a build.
	pub required_sources: Vec<String>,
	/// Shorthand for `filter.allow`.
	pub allow: Option<AllowConfig>,
	pub providers: ProvidersConfig,
	pub filter: FilterConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvidersConfig {
	/// Provider ids accepted in addition to the built-in set.
	pub known: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
	pub allow: Option<AllowConfig>,
	pub deny: IndexMap<String, PatternsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AllowConfig {
	All(AllKeyword),
	Providers(IndexMap<String, PatternsConfig>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PatternsConfig {
	All(AllKeyword),
	List(Vec<PatternConfig>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PatternConfig {
	Text(String),
	Regex { regex: String },
}

/// The literal string `"all"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllKeyword;

impl<'de> Deserialize<'de> for AllKeyword {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		struct Visitor;

		impl de::Visitor<'_> for Visitor {
			type Value = AllKeyword;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str("the string \"all\"")
			}

			fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<AllKeyword, E> {
				if value.eq_ignore_ascii_case("all") {
					Ok(AllKeyword)
				} else {
					Err(E::invalid_value(Unexpected::Str(value), &self))
				}
			}
		}

		deserializer.deserialize_str(Visitor)
	}
}

impl CatalogConfig {
	/// Reads and parses a configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&text)
	}

	pub fn from_toml_str(text: &str) -> Result<Self> {
		Ok(toml::from_str(text)?)
	}

	/// Built-in providers plus `providers.known`.
	pub fn registry(&self) -> ProviderRegistry {
		let mut registry = ProviderRegistry::builtin();
		registry.extend(self.providers.known.iter().map(String::as_str));
		registry
	}

	/// Compiles regex patterns and assembles the filter spec.
	pub fn filter_spec(&self) -> Result<FilterSpec> {
		let allow = match self.filter.allow.as_ref().or(self.allow.as_ref()) {
			None | Some(AllowConfig::All(_)) => AllowSpec::All,
			Some(AllowConfig::Providers(map)) => AllowSpec::Providers(convert_map(map)?),
		};
		Ok(FilterSpec {
			allow,
			deny: convert_map(&self.filter.deny)?,
		})
	}

	/// Builds pipeline options from this configuration.
	pub fn to_pipeline_options(&self) -> Result<PipelineOptions> {
		let registry = self.registry();
		let filter = self.filter_spec()?;
		self.warn_unregistered(&registry, &filter);

		Ok(PipelineOptions::new()
			.with_filter(filter)
			.with_prefer(self.prefer.iter().cloned())
			.with_registry(registry)
			.with_required_sources(self.required_sources.iter().cloned()))
	}

	fn warn_unregistered(&self, registry: &ProviderRegistry, filter: &FilterSpec) {
		let allow_keys = match &filter.allow {
			AllowSpec::All => None,
			AllowSpec::Providers(map) => Some(map.keys()),
		};
		let unknown: Vec<&str> = self
			.prefer
			.iter()
			.chain(allow_keys.into_iter().flatten())
			.chain(filter.deny.keys())
			.map(String::as_str)
			.filter(|id| !registry.contains(id))
			.collect();
		if !unknown.is_empty() {
			tracing::warn!(?unknown, "configuration names unregistered providers");
		}
	}
}

fn convert_map(map: &IndexMap<String, PatternsConfig>) -> Result<IndexMap<String, PatternSet>> {
	map.iter()
		.map(|(provider, patterns)| Ok((provider.clone(), convert_patterns(provider, patterns)?)))
		.collect()
}

fn convert_patterns(provider: &str, patterns: &PatternsConfig) -> Result<PatternSet> {
	let list = match patterns {
		PatternsConfig::All(_) => return Ok(PatternSet::All),
		PatternsConfig::List(list) => list,
	};
	let converted = list
		.iter()
		.map(|pattern| match pattern {
			PatternConfig::Text(text) => Ok(Pattern::parse(text)),
			PatternConfig::Regex { regex } => Regex::new(regex).map(Pattern::Regex).map_err(|error| ConfigError::Regex {
				provider: provider.to_string(),
				pattern: regex.clone(),
				error,
			}),
		})
		.collect::<Result<Vec<_>>>()?;
	Ok(PatternSet::List(converted))
}
