//! Derived fields computed once per merged, filtered record.
//!
//! Enrichment is a pure projection of a single record: no lookups into other
//! records, no I/O. It runs after merge so that defaults never shadow a value
//! supplied by a lower-precedence source.

use llmdb_primitives::CapabilityPath;

use crate::model::{Item, Provider};


/// Capability leaves that read as explicit `false` when a record omits them.
pub const DEFAULT_CAPABILITIES: &[&str] = &[
	"chat",
	"embeddings",
	"reasoning.enabled",
	"tools.enabled",
	"tools.streaming",
	"tools.strict",
	"tools.parallel",
	"json.native",
	"json.schema",
	"json.strict",
	"streaming.text",
	"streaming.tool_calls",
];

/// Trailing id segments that mark a release rather than a family.
const RELEASE_TAGS: &[&str] = &["latest", "preview", "exp"];

/// Fills `name` from `id` when absent.
pub fn enrich_provider(provider: &mut Provider) {
	if provider.name.is_none() {
		provider.name = Some(provider.id.to_string());
	}
}

/// Fills capability defaults, `family` and `provider_model_id`.
pub fn enrich_item(item: &mut Item) {
	for leaf in DEFAULT_CAPABILITIES {
		item.capabilities.set_default(&CapabilityPath::new(leaf), false);
	}
	if item.family.is_none() {
		item.family = Some(derive_family(&item.id));
	}
	if item.provider_model_id.is_none() {
		item.provider_model_id = Some(item.id.clone());
	}
}

/// Derives a family name by stripping trailing release segments from `id`.
///
/// Strips, repeatedly from the end: `YYYY-MM-DD` dates, digit runs of four or
/// more (`0613`, `20241022`), and the tags `latest`, `preview` and `exp`. At
/// least one segment always remains.
///
/// ```
/// use llmdb_catalog::derive_family;
///
/// assert_eq!(derive_family("gpt-4o-2024-08-06"), "gpt-4o");
/// assert_eq!(derive_family("gpt-3.5-turbo-0613"), "gpt-3.5-turbo");
/// assert_eq!(derive_family("gpt-4"), "gpt-4");
/// ```
pub fn derive_family(id: &str) -> String {
	let mut segments: Vec<&str> = id.split('-').collect();
	loop {
		let n = segments.len();
		if n > 3 && is_date(&segments[n - 3..]) {
			segments.truncate(n - 3);
		} else if n > 1 && is_release_tag(segments[n - 1]) {
			segments.pop();
		} else {
			break;
		}
	}
	segments.join("-")
}

fn is_date(segments: &[&str]) -> bool {
	let widths = [4, 2, 2];
	segments.len() == 3
		&& segments
			.iter()
			.zip(widths)
			.all(|(s, width)| s.len() == width && all_digits(s))
}

fn is_release_tag(segment: &str) -> bool {
	RELEASE_TAGS.contains(&segment) || (segment.len() >= 4 && all_digits(segment))
}

fn all_digits(s: &str) -> bool {
	!s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
