#![allow(unused_crate_dependencies)]

use std::sync::Arc;

use llmdb_catalog::{FilterSpec, PatternSet, PipelineError, PipelineOptions, RecordSet, Source, StaticSource};
use llmdb_primitives::{ItemRef, ProviderId, SpecError};
use llmdb_runtime::{
	CapabilityQuery, Catalog, MemoryStorage, Overrides, PersistError, ReloadError, ResolveError, Selection,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn records() -> RecordSet {
	RecordSet::new()
		.with_provider(json!({"id": "openai", "name": "OpenAI"}))
		.with_provider(json!({"id": "anthropic", "name": "Anthropic"}))
		.with_item(json!({
			"id": "gpt-4o",
			"provider": "openai",
			"aliases": ["omni"],
			"capabilities": {"chat": true, "tools": {"enabled": true}},
		}))
		.with_item(json!({"id": "text-embedding-3-small", "provider": "openai", "capabilities": {"embeddings": true}}))
		.with_item(json!({
			"id": "claude-3-5-sonnet",
			"provider": "anthropic",
			"capabilities": {"chat": true, "tools": true},
		}))
		.with_item(json!({
			"id": "claude-3-7-sonnet",
			"provider": "anthropic",
			"capabilities": {"chat": true, "tools": true, "reasoning": {"enabled": true}},
		}))
}

fn catalog(options: PipelineOptions) -> Catalog {
	let source: Arc<dyn Source> = Arc::new(StaticSource::new("base", records()));
	Catalog::new(vec![source], options)
}

fn refs(items: &[ItemRef]) -> Vec<String> {
	items.iter().map(ToString::to_string).collect()
}

/// Every query has a defined answer before the first load.
#[test]
fn test_unloaded_catalog_answers_empty() {
	let catalog = catalog(PipelineOptions::new());
	let query = CapabilityQuery::new().require("chat");

	assert!(!catalog.is_loaded());
	assert_eq!(catalog.current_generation(), 0);
	assert!(catalog.list(None).is_empty());
	assert!(catalog.list_providers().is_empty());
	assert!(catalog.get("openai", "gpt-4o").is_none());
	assert!(!catalog.is_allowed("openai", "gpt-4o"));
	assert!(catalog.select(&query).is_empty());
	assert_eq!(catalog.select_first(&query), Selection::NoMatch);
	assert!(matches!(
		catalog.resolve_spec("openai:gpt-4o"),
		Err(ResolveError::NotFound(_))
	));
}

/// The preference order decides between equally qualified items.
#[test]
fn test_prefer_orders_selection() {
	let catalog = catalog(PipelineOptions::new());
	catalog.load().unwrap();

	let query = CapabilityQuery::new().require("chat").require("tools");
	assert_eq!(
		refs(&catalog.select(&query.clone().prefer(["anthropic", "openai"]))),
		["anthropic:claude-3-5-sonnet", "anthropic:claude-3-7-sonnet", "openai:gpt-4o"]
	);
	assert_eq!(
		refs(&catalog.select(&query)),
		["openai:gpt-4o", "anthropic:claude-3-5-sonnet", "anthropic:claude-3-7-sonnet"]
	);
	assert_eq!(
		catalog.select_first(&query.prefer(["anthropic"])),
		Selection::Match(ItemRef::new(ProviderId::new("anthropic"), "claude-3-5-sonnet"))
	);
}

/// The configured preference order applies when a query names none.
#[test]
fn test_snapshot_prefer_is_default() {
	let catalog = catalog(PipelineOptions::new().with_prefer(["anthropic"]));
	catalog.load().unwrap();
	let first = catalog.select_first(&CapabilityQuery::new().require("chat")).into_option().unwrap();
	assert_eq!(first.provider.as_str(), "anthropic");
}

/// Forbidden predicates, explicit `false` requirements and scope narrow results.
#[test]
fn test_forbid_and_scope() {
	let catalog = catalog(PipelineOptions::new());
	catalog.load().unwrap();

	let no_reasoning = CapabilityQuery::new().require("chat").forbid("reasoning.enabled");
	assert_eq!(
		refs(&catalog.select(&no_reasoning)),
		["openai:gpt-4o", "anthropic:claude-3-5-sonnet"]
	);

	let scoped = CapabilityQuery::new().require("chat").scope("Anthropic");
	assert_eq!(
		refs(&catalog.select(&scoped)),
		["anthropic:claude-3-5-sonnet", "anthropic:claude-3-7-sonnet"]
	);

	let non_chat = CapabilityQuery::new().require_eq("chat", false);
	assert_eq!(refs(&catalog.select(&non_chat)), ["openai:text-embedding-3-small"]);

	let none = CapabilityQuery::new().require("chat").scope("mistral");
	assert_eq!(catalog.select_first(&none), Selection::NoMatch);
}

/// Lookups follow aliases; spec strings resolve through the same path.
#[test]
fn test_lookup_and_spec_resolution() {
	let catalog = catalog(PipelineOptions::new());
	catalog.load().unwrap();

	assert_eq!(catalog.get("openai", "omni").unwrap().id, "gpt-4o");
	assert_eq!(catalog.list(Some("anthropic")).len(), 2);
	assert_eq!(catalog.list(None).len(), 4);
	assert_eq!(catalog.provider("openai").unwrap().display_name(), "OpenAI");
	assert_eq!(catalog.resolve_spec("OpenAI:omni").unwrap().id, "gpt-4o");
	assert_eq!(
		catalog.resolve_spec("nosuch:model"),
		Err(ResolveError::Spec(SpecError::UnknownProvider("nosuch".to_string())))
	);
	assert_eq!(
		catalog.resolve_spec("gpt-4o"),
		Err(ResolveError::Spec(SpecError::InvalidFormat("gpt-4o".to_string())))
	);
	assert!(matches!(
		catalog.resolve_spec("openai:gpt-5"),
		Err(ResolveError::NotFound(item)) if item.item == "gpt-5"
	));
}

/// A failed reload leaves the previous snapshot and settings in place.
#[test]
fn test_failed_reload_keeps_previous_snapshot() {
	let catalog = catalog(PipelineOptions::new());
	assert_eq!(catalog.load().unwrap(), 1);

	let deny_all = FilterSpec::allow_all()
		.deny("openai", PatternSet::All)
		.deny("anthropic", PatternSet::All);
	let err = catalog.reload(Some(Overrides::new().filter(deny_all))).unwrap_err();
	assert!(matches!(err, ReloadError::Pipeline(PipelineError::NoItems { .. })));

	assert_eq!(catalog.current_generation(), 1);
	assert_eq!(catalog.list(None).len(), 4);
	// The rejected filter was not adopted.
	assert_eq!(catalog.reload(None).unwrap(), 2);
	assert_eq!(catalog.list(None).len(), 4);
}

/// Overrides replace the filter and preference order and layer records on top.
#[test]
fn test_reload_with_overrides() {
	let catalog = catalog(PipelineOptions::new());
	catalog.load().unwrap();

	let patch = RecordSet::new()
		.with_item(json!({"id": "gpt-4o", "provider": "openai", "deprecated": true}))
		.with_item(json!({"id": "gpt-4o-mini", "provider": "openai", "capabilities": {"chat": true}}));
	let overrides = Overrides::new()
		.filter(FilterSpec::allow_all().deny("openai", PatternSet::list(["text-embedding-*"])))
		.prefer(["anthropic"])
		.records(patch);
	assert_eq!(catalog.reload(Some(overrides)).unwrap(), 2);

	assert!(catalog.get("openai", "gpt-4o").unwrap().deprecated);
	assert!(catalog.get("openai", "gpt-4o-mini").is_some());
	assert!(!catalog.is_allowed("openai", "text-embedding-3-small"));
	assert!(catalog.get("openai", "text-embedding-3-small").is_none());
	let first = catalog.select_first(&CapabilityQuery::new().require("chat")).into_option().unwrap();
	assert_eq!(first.provider.as_str(), "anthropic");

	// Adopted overrides carry into plain reloads.
	assert_eq!(catalog.reload(None).unwrap(), 3);
	assert!(catalog.get("openai", "gpt-4o-mini").is_some());
	assert!(!catalog.is_allowed("openai", "text-embedding-3-small"));
}

/// Clearing returns to the unloaded state; the counter keeps going.
#[test]
fn test_clear_then_reload() {
	let catalog = catalog(PipelineOptions::new());
	catalog.load().unwrap();
	catalog.clear();

	assert_eq!(catalog.current_generation(), 0);
	assert!(catalog.get("openai", "gpt-4o").is_none());
	assert_eq!(catalog.reload(None).unwrap(), 2);
}

/// A persisted snapshot restores into a fresh catalog without rebuilding.
#[test]
fn test_persist_and_restore() {
	let storage = Arc::new(MemoryStorage::new());
	let writer = catalog(PipelineOptions::new()).with_storage(storage.clone());
	assert_eq!(writer.persist(), Err(PersistError::NotLoaded));
	writer.load().unwrap();
	writer.persist().unwrap();

	let reader = Catalog::new(Vec::new(), PipelineOptions::new().with_prefer(["anthropic"])).with_storage(storage);
	assert_eq!(reader.load_persisted().unwrap(), 1);
	assert_eq!(reader.get("openai", "omni").unwrap().id, "gpt-4o");
	assert_eq!(reader.list(None).len(), 4);
	let first = reader.select_first(&CapabilityQuery::new().require("chat")).into_option().unwrap();
	assert_eq!(first.provider.as_str(), "anthropic");

	let bare = catalog(PipelineOptions::new());
	assert_eq!(bare.load_persisted(), Err(PersistError::NoStorage));
	let empty = catalog(PipelineOptions::new()).with_storage(Arc::new(MemoryStorage::new()));
	assert_eq!(empty.load_persisted(), Err(PersistError::Missing));
}

/// A persisted document with nothing to serve is refused; the current
/// snapshot stays published.
#[test]
fn test_empty_persisted_document_keeps_current_snapshot() {
	let empty = br#"{"version": 1, "generated_at": "2026-01-01T00:00:00Z", "providers": {}}"#.to_vec();
	let catalog = catalog(PipelineOptions::new()).with_storage(Arc::new(MemoryStorage::with_bytes(empty)));
	catalog.load().unwrap();

	assert!(matches!(
		catalog.load_persisted(),
		Err(PersistError::Empty(PipelineError::NoProviders { .. }))
	));
	assert_eq!(catalog.current_generation(), 1);
	assert_eq!(catalog.list(None).len(), 4);
}

/// Provider ids in lookups are matched the same way spec strings are.
#[test]
fn test_lookups_normalize_provider() {
	let catalog = catalog(PipelineOptions::new().with_filter(
		FilterSpec::allow_all().deny("openai", PatternSet::list(["text-embedding-*"])),
	));
	catalog.load().unwrap();

	assert_eq!(catalog.get(" OpenAI ", "omni").unwrap().id, "gpt-4o");
	assert_eq!(catalog.list(Some("Anthropic")).len(), 2);
	assert_eq!(catalog.provider("ANTHROPIC").unwrap().display_name(), "Anthropic");
	assert!(catalog.is_allowed("OpenAI", "gpt-4o"));
	assert!(!catalog.is_allowed("OpenAI", "text-embedding-3-small"));
	assert_eq!(
		catalog.get("OpenAI", "gpt-4o").map(|item| item.id.clone()),
		catalog.resolve_spec("OpenAI:gpt-4o").ok().map(|item| item.id.clone())
	);
}
