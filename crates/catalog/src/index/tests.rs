use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;

fn provider(id: &str) -> Provider {
	serde_json::from_value(json!({ "id": id })).unwrap()
}

fn item(provider: &str, id: &str, aliases: &[&str]) -> Item {
	serde_json::from_value(json!({ "id": id, "provider": provider, "aliases": aliases })).unwrap()
}

fn index(items: Vec<Item>) -> CatalogIndex {
	let mut builder = CatalogIndex::builder();
	builder.push_provider(provider("openai"));
	builder.push_provider(provider("anthropic"));
	builder.extend_items(items);
	builder.build()
}

/// Canonical ids and aliases resolve to the same item.
#[test]
fn test_lookup_by_id_and_alias() {
	let idx = index(vec![
		item("openai", "gpt-4o-2024-08-06", &["gpt-4o"]),
		item("anthropic", "claude-3-5-sonnet-20241022", &["claude-3-5-sonnet-latest"]),
	]);

	let by_alias = idx.item("openai", "gpt-4o").unwrap();
	assert_eq!(by_alias.id, "gpt-4o-2024-08-06");
	assert!(Arc::ptr_eq(by_alias, idx.item_by_id("openai", "gpt-4o-2024-08-06").unwrap()));
	assert_eq!(idx.resolve_alias("anthropic", "claude-3-5-sonnet-latest"), Some("claude-3-5-sonnet-20241022"));
	assert!(idx.item_by_id("openai", "gpt-4o").is_none());
	assert!(idx.item("anthropic", "gpt-4o").is_none());
	assert!(idx.item("mistral", "gpt-4o").is_none());
}

/// An alias naming another item's canonical id loses, even if listed first.
#[test]
fn test_alias_never_shadows_canonical_id() {
	let idx = index(vec![
		item("openai", "gpt-4-turbo", &["gpt-4"]),
		item("openai", "gpt-4", &[]),
	]);

	assert_eq!(idx.item("openai", "gpt-4").unwrap().id, "gpt-4");
	assert!(idx.item("openai", "gpt-4-turbo").unwrap().aliases.is_empty());
	assert_eq!(
		idx.collisions(),
		[Collision {
			provider: ProviderId::new("openai"),
			key: "gpt-4".to_string(),
			item: "gpt-4-turbo".to_string(),
			kind: CollisionKind::CanonicalId {
				owner: "gpt-4".to_string()
			},
		}]
	);
}

/// The first item to claim an alias keeps it.
#[test]
fn test_first_alias_claim_wins() {
	let idx = index(vec![
		item("openai", "gpt-4o-2024-05-13", &["gpt-4o"]),
		item("openai", "gpt-4o-2024-08-06", &["gpt-4o", "chatgpt-4o"]),
	]);

	assert_eq!(idx.resolve_alias("openai", "gpt-4o"), Some("gpt-4o-2024-05-13"));
	assert_eq!(idx.resolve_alias("openai", "chatgpt-4o"), Some("gpt-4o-2024-08-06"));
	assert_eq!(idx.item("openai", "gpt-4o-2024-08-06").unwrap().aliases, ["chatgpt-4o"]);
	assert!(matches!(
		&idx.collisions()[0].kind,
		CollisionKind::Alias { owner } if owner == "gpt-4o-2024-05-13"
	));
}

/// Alias spaces are per provider.
#[test]
fn test_alias_spaces_are_per_provider() {
	let idx = index(vec![
		item("openai", "gpt-4o", &["flagship"]),
		item("anthropic", "claude-3-opus", &["flagship"]),
	]);
	assert!(idx.collisions().is_empty());
	assert_eq!(idx.resolve_alias("openai", "flagship"), Some("gpt-4o"));
	assert_eq!(idx.resolve_alias("anthropic", "flagship"), Some("claude-3-opus"));
}

/// Self-aliases and repeats are dropped silently.
#[test]
fn test_self_alias_is_not_a_collision() {
	let idx = index(vec![item("openai", "gpt-4", &["gpt-4", "four", "four"])]);
	assert!(idx.collisions().is_empty());
	assert_eq!(idx.item("openai", "gpt-4").unwrap().aliases, ["four"]);
}

/// Duplicate canonical ids keep the first item.
#[test]
fn test_duplicate_id_keeps_first() {
	let mut second = item("openai", "gpt-4", &[]);
	second.name = Some("second".into());
	let idx = index(vec![item("openai", "gpt-4", &[]), second]);

	assert_eq!(idx.item_count(), 1);
	assert!(idx.item("openai", "gpt-4").unwrap().name.is_none());
	assert_eq!(idx.collisions()[0].kind, CollisionKind::DuplicateId);
}

/// Groups follow provider order, then item order.
#[test]
fn test_grouping_preserves_order() {
	let idx = index(vec![
		item("anthropic", "claude-3-haiku", &[]),
		item("openai", "gpt-4", &[]),
		item("anthropic", "claude-3-opus", &[]),
		item("mistral", "orphan", &[]),
	]);

	let ids: Vec<&str> = idx.items().map(|i| i.id.as_str()).collect();
	assert_eq!(ids, ["gpt-4", "claude-3-haiku", "claude-3-opus"]);
	let providers: Vec<&str> = idx.providers().map(|p| p.id.as_str()).collect();
	assert_eq!(providers, ["openai", "anthropic"]);
	assert!(idx.items_of("mistral").is_empty());
}

/// Resolving any key twice lands on the same canonical item.
#[test]
fn test_alias_resolution_is_idempotent() {
	let idx = index(vec![
		item("openai", "gpt-4o-2024-08-06", &["gpt-4o", "omni"]),
		item("openai", "gpt-4", &["four"]),
	]);
	for key in ["gpt-4o", "omni", "gpt-4o-2024-08-06", "four", "gpt-4"] {
		let first = idx.item("openai", key).unwrap();
		let again = idx.item("openai", &first.id).unwrap();
		assert!(Arc::ptr_eq(first, again), "key {key}");
	}
}
