//! Field-policy merge of records describing the same entity.
//!
//! # Precedence Contract
//!
//! Sources are folded in caller order. For [`MergePolicy::Replace`] and
//! [`MergePolicy::DeepMerge`] leaves, the last source to mention a field wins.
//! [`MergePolicy::Union`] lists accumulate across every source, keeping the
//! position where a value was first seen. A leaf absent from a later source is
//! never removed.
//!
//! Providers merge by `id`; items merge by `(provider, id)`. A record seen in
//! only one source passes through unchanged.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json::Value;

use crate::record::{Record, RecordSet, str_field};
use crate::schema::{FieldType, ITEM_SCHEMA, MergePolicy, PROVIDER_SCHEMA, Schema, default_policy};


/// Merges `incoming` over `existing` and returns the result.
pub fn merge(existing: Record, incoming: Record, schema: &Schema) -> Record {
	let mut out = existing;
	merge_into(&mut out, incoming, Some(schema));
	out
}

/// Merges `incoming` into `target` in place.
///
/// `schema` selects per-field policies; `None` applies [`default_policy`] to
/// every field.
pub fn merge_into(target: &mut Record, incoming: Record, schema: Option<&Schema>) {
	for (key, value) in incoming {
		let (policy, ty) = match schema.and_then(|s| s.field(&key)) {
			Some(spec) => (spec.policy, Some(spec.ty)),
			None => (default_policy(&value), None),
		};
		match target.get_mut(&key) {
			Some(slot) if matches!(ty, Some(FieldType::Capabilities)) => merge_capability(slot, value),
			Some(slot) => merge_value(slot, value, policy, ty.and_then(nested_schema)),
			None => {
				let value = match (policy, value) {
					(MergePolicy::Union, Value::Array(list)) => Value::Array(dedup(list)),
					(_, value) => value,
				};
				target.insert(key, value);
			}
		}
	}
}

fn merge_value(slot: &mut Value, incoming: Value, policy: MergePolicy, nested: Option<&Schema>) {
	match (policy, slot, incoming) {
		(MergePolicy::Union, Value::Array(current), Value::Array(new)) => {
			for value in new {
				if !current.contains(&value) {
					current.push(value);
				}
			}
		}
		(MergePolicy::DeepMerge, Value::Object(current), Value::Object(new)) => {
			merge_into(current, new, nested);
		}
		// Shape mismatch or plain replace: incoming wins outright.
		(_, slot, new) => *slot = new,
	}
}

/// Merges capability trees node by node.
///
/// A scalar facing a subtree stands for that subtree's `enabled` leaf, so
/// `tools: true` merged with `tools: { streaming: true }` keeps both leaves.
fn merge_capability(slot: &mut Value, incoming: Value) {
	match (slot, incoming) {
		(Value::Object(current), Value::Object(new)) => {
			for (key, value) in new {
				match current.get_mut(&key) {
					Some(existing) => merge_capability(existing, value),
					None => {
						current.insert(key, value);
					}
				}
			}
		}
		(Value::Object(current), scalar) => {
			current.insert("enabled".to_string(), scalar);
		}
		(slot, Value::Object(mut new)) => {
			let scalar = std::mem::take(slot);
			if !new.contains_key("enabled") {
				new.insert("enabled".to_string(), scalar);
			}
			*slot = Value::Object(new);
		}
		(slot, scalar) => *slot = scalar,
	}
}

fn nested_schema(ty: FieldType) -> Option<&'static Schema> {
	match ty {
		FieldType::Object(schema) => schema,
		_ => None,
	}
}

fn dedup(list: Vec<Value>) -> Vec<Value> {
	let mut out: Vec<Value> = Vec::with_capacity(list.len());
	for value in list {
		if !out.contains(&value) {
			out.push(value);
		}
	}
	out
}

/// Accumulates records from successive sources, keyed by entity identity.
#[derive(Debug, Default)]
pub struct Merger {
	providers: IndexMap<String, Record>,
	items: IndexMap<(String, String), Record>,
}

impl Merger {
	pub fn new() -> Self {
		Self::default()
	}

	/// Folds a provider record in. Returns false if it has no `id`.
	pub fn add_provider(&mut self, record: Record) -> bool {
		let Some(id) = str_field(&record, "id").map(str::to_string) else {
			return false;
		};
		fold(self.providers.entry(id), record, &PROVIDER_SCHEMA);
		true
	}

	/// Folds an item record in. Returns false if it lacks `provider` or `id`.
	pub fn add_item(&mut self, record: Record) -> bool {
		let (Some(provider), Some(id)) = (str_field(&record, "provider"), str_field(&record, "id")) else {
			return false;
		};
		let key = (provider.to_string(), id.to_string());
		fold(self.items.entry(key), record, &ITEM_SCHEMA);
		true
	}

	/// Folds a whole source in, providers first.
	pub fn add_set(&mut self, set: RecordSet) {
		for record in set.providers {
			self.add_provider(record);
		}
		for record in set.items {
			self.add_item(record);
		}
	}

	pub fn provider_count(&self) -> usize {
		self.providers.len()
	}

	pub fn item_count(&self) -> usize {
		self.items.len()
	}

	/// Returns the merged records in first-seen order.
	pub fn finish(self) -> RecordSet {
		RecordSet {
			providers: self.providers.into_values().collect(),
			items: self.items.into_values().collect(),
		}
	}
}

fn fold<K>(entry: Entry<'_, K, Record>, record: Record, schema: &Schema) {
	match entry {
		Entry::Occupied(mut slot) => merge_into(slot.get_mut(), record, Some(schema)),
		Entry::Vacant(slot) => {
			let mut fresh = Record::new();
			merge_into(&mut fresh, record, Some(schema));
			slot.insert(fresh);
		}
	}
}

/// Merges whole record sets in order.
pub fn merge_sources<I: IntoIterator<Item = RecordSet>>(sets: I) -> RecordSet {
	let mut merger = Merger::new();
	for set in sets {
		merger.add_set(set);
	}
	merger.finish()
}
