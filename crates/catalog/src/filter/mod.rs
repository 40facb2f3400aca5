//! Allow/deny filter specifications and their compiled matcher.
//!
//! # Semantics
//!
//! - `allow` is either [`AllowSpec::All`] or a per-provider map. An empty map
//!   behaves exactly like `All`: missing configuration never hides the whole
//!   catalog. A non-empty map hides every provider it does not list.
//! - Each provider's entry is [`PatternSet::All`] or a list of patterns. A
//!   pattern is an exact id, an anchored `*` glob, or a caller-supplied regex;
//!   an id is matched if any pattern matches.
//! - `deny` is checked after `allow` and always wins.
//! - Entries naming a provider outside the known set are dropped and reported
//!   as [`FilterWarning`]s rather than failing compilation.
//!
//! The resulting [`CompiledFilter`] is immutable and safe to share across
//! reader threads.

use std::fmt;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use indexmap::map::Entry;
use llmdb_primitives::ProviderId;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};


/// One id pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
	Exact(String),
	/// `*` wildcard, anchored at both ends.
	Glob(String),
	Regex(Regex),
}

impl Pattern {
	/// Classifies a textual pattern: anything containing `*` is a glob.
	pub fn parse(text: &str) -> Self {
		if text.contains('*') {
			Self::Glob(text.to_string())
		} else {
			Self::Exact(text.to_string())
		}
	}
}

impl From<&str> for Pattern {
	fn from(value: &str) -> Self {
		Self::parse(value)
	}
}

impl From<Regex> for Pattern {
	fn from(value: Regex) -> Self {
		Self::Regex(value)
	}
}

impl fmt::Display for Pattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Exact(s) | Self::Glob(s) => f.write_str(s),
			Self::Regex(re) => write!(f, "/{}/", re.as_str()),
		}
	}
}

/// Patterns attached to one provider.
#[derive(Debug, Clone)]
pub enum PatternSet {
	All,
	List(Vec<Pattern>),
}

impl PatternSet {
	pub fn list<I, P>(patterns: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<Pattern>,
	{
		Self::List(patterns.into_iter().map(Into::into).collect())
	}
}

#[derive(Debug, Clone, Default)]
pub enum AllowSpec {
	#[default]
	All,
	Providers(IndexMap<String, PatternSet>),
}

impl AllowSpec {
	/// Returns true if this spec admits every provider.
	pub fn is_all(&self) -> bool {
		match self {
			Self::All => true,
			Self::Providers(map) => map.is_empty(),
		}
	}
}

/// Uncompiled filter configuration.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
	pub allow: AllowSpec,
	pub deny: IndexMap<String, PatternSet>,
}

impl FilterSpec {
	/// Admits everything.
	pub fn allow_all() -> Self {
		Self::default()
	}

	/// Adds (or extends) an allow entry.
	pub fn allow(mut self, provider: &str, patterns: PatternSet) -> Self {
		if let AllowSpec::All = self.allow {
			self.allow = AllowSpec::Providers(IndexMap::new());
		}
		if let AllowSpec::Providers(map) = &mut self.allow {
			insert_patterns(map, provider, patterns);
		}
		self
	}

	/// Adds (or extends) a deny entry.
	pub fn deny(mut self, provider: &str, patterns: PatternSet) -> Self {
		insert_patterns(&mut self.deny, provider, patterns);
		self
	}
}

fn insert_patterns(map: &mut IndexMap<String, PatternSet>, provider: &str, patterns: PatternSet) {
	match map.entry(provider.to_string()) {
		Entry::Vacant(slot) => {
			slot.insert(patterns);
		}
		Entry::Occupied(mut slot) => match (slot.get_mut(), patterns) {
			(PatternSet::List(existing), PatternSet::List(more)) => existing.extend(more),
			(PatternSet::All, PatternSet::List(_)) => {}
			(current, PatternSet::All) => *current = PatternSet::All,
		},
	}
}

/// Which half of a filter a warning came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterList {
	Allow,
	Deny,
}

impl fmt::Display for FilterList {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Allow => f.write_str("allow"),
			Self::Deny => f.write_str("deny"),
		}
	}
}

/// Non-fatal problems found while compiling a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterWarning {
	/// Entry names a provider outside the known set; ignored.
	UnknownProvider { list: FilterList, provider: String },
	/// Glob failed to compile; the pattern is ignored.
	InvalidGlob {
		list: FilterList,
		provider: String,
		pattern: String,
		reason: String,
	},
}

impl fmt::Display for FilterWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::UnknownProvider { list, provider } => {
				write!(f, "{list} filter references unknown provider `{provider}`; ignored")
			}
			Self::InvalidGlob {
				list,
				provider,
				pattern,
				reason,
			} => write!(f, "{list} filter for `{provider}`: invalid glob `{pattern}`: {reason}"),
		}
	}
}

/// Compiled patterns for one provider.
#[derive(Debug, Clone)]
struct Matcher {
	all: bool,
	exact: FxHashSet<Box<str>>,
	globs: GlobSet,
	regexes: Vec<Regex>,
}

impl Matcher {
	fn matches(&self, id: &str) -> bool {
		self.all || self.exact.contains(id) || self.globs.is_match(id) || self.regexes.iter().any(|re| re.is_match(id))
	}
}

/// Immutable `(provider, id) -> bool` predicate.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
	/// `None` admits every provider.
	allow: Option<FxHashMap<ProviderId, Matcher>>,
	deny: FxHashMap<ProviderId, Matcher>,
}

impl Default for CompiledFilter {
	fn default() -> Self {
		Self::allow_all()
	}
}

impl CompiledFilter {
	/// Filter that admits everything.
	pub fn allow_all() -> Self {
		Self {
			allow: None,
			deny: FxHashMap::default(),
		}
	}

	/// Compiles `spec` against the providers present in the catalog.
	pub fn compile(spec: &FilterSpec, known: &[ProviderId]) -> (Self, Vec<FilterWarning>) {
		let known: FxHashMap<&str, &ProviderId> = known.iter().map(|id| (id.as_str(), id)).collect();
		let mut warnings = Vec::new();

		let allow = match &spec.allow {
			AllowSpec::Providers(map) if !map.is_empty() => {
				Some(compile_map(FilterList::Allow, map, &known, &mut warnings))
			}
			_ => None,
		};
		let deny = compile_map(FilterList::Deny, &spec.deny, &known, &mut warnings);

		(Self { allow, deny }, warnings)
	}

	/// Returns true if `(provider, id)` passes allow and is not denied.
	pub fn is_allowed(&self, provider: &str, id: &str) -> bool {
		let allowed = match &self.allow {
			None => true,
			Some(map) => map.get(provider).is_some_and(|m| m.matches(id)),
		};
		allowed && !self.deny.get(provider).is_some_and(|m| m.matches(id))
	}

	/// Returns true if the allow side admits any id of `provider`.
	pub fn admits_provider(&self, provider: &str) -> bool {
		match &self.allow {
			None => true,
			Some(map) => map.contains_key(provider),
		}
	}
}

fn compile_map(
	list: FilterList,
	map: &IndexMap<String, PatternSet>,
	known: &FxHashMap<&str, &ProviderId>,
	warnings: &mut Vec<FilterWarning>,
) -> FxHashMap<ProviderId, Matcher> {
	let mut out = FxHashMap::default();
	for (raw, patterns) in map {
		let Some(&provider) = known.get(ProviderId::normalize(raw).as_str()) else {
			warnings.push(FilterWarning::UnknownProvider {
				list,
				provider: raw.clone(),
			});
			continue;
		};
		let matcher = compile_patterns(list, provider, patterns, warnings);
		out.insert(provider.clone(), matcher);
	}
	out
}

fn compile_patterns(
	list: FilterList,
	provider: &ProviderId,
	patterns: &PatternSet,
	warnings: &mut Vec<FilterWarning>,
) -> Matcher {
	let mut matcher = Matcher {
		all: false,
		exact: FxHashSet::default(),
		globs: GlobSet::empty(),
		regexes: Vec::new(),
	};
	let patterns = match patterns {
		PatternSet::All => {
			matcher.all = true;
			return matcher;
		}
		PatternSet::List(patterns) => patterns,
	};

	let mut globs = GlobSetBuilder::new();
	for pattern in patterns {
		match pattern {
			Pattern::Exact(id) => {
				matcher.exact.insert(Box::from(id.as_str()));
			}
			Pattern::Glob(glob) => match GlobBuilder::new(glob).literal_separator(false).build() {
				Ok(compiled) => {
					globs.add(compiled);
				}
				Err(err) => warnings.push(FilterWarning::InvalidGlob {
					list,
					provider: provider.to_string(),
					pattern: glob.clone(),
					reason: err.to_string(),
				}),
			},
			Pattern::Regex(re) => matcher.regexes.push(re.clone()),
		}
	}
	match globs.build() {
		Ok(set) => matcher.globs = set,
		Err(err) => warnings.push(FilterWarning::InvalidGlob {
			list,
			provider: provider.to_string(),
			pattern: "<set>".to_string(),
			reason: err.to_string(),
		}),
	}
	matcher
}
