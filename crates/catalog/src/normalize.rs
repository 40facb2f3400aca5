//! Shape fixes applied to every record before validation.

use serde_json::{Map, Value};

use crate::record::{Record, RecordKind};
use crate::schema::Schema;

/// Normalizes a raw record in place and returns it.
///
/// - top-level `null` fields are dropped, so they never overwrite during merge
/// - `id` is trimmed; provider ids are lower-cased
/// - fields the schema does not know are moved under `extra`
pub fn normalize(kind: RecordKind, mut record: Record) -> Record {
	record.retain(|_, value| !value.is_null());

	trim_string(&mut record, "id", kind == RecordKind::Provider);
	if kind == RecordKind::Item {
		trim_string(&mut record, "provider", true);
	}

	let schema = Schema::for_kind(kind);
	let unknown: Vec<String> = record.keys().filter(|k| !schema.knows(k)).cloned().collect();
	if unknown.is_empty() {
		return record;
	}

	let mut moved = Map::new();
	for key in unknown {
		if let Some(value) = record.remove(&key) {
			moved.insert(key, value);
		}
	}
	// A malformed `extra` is reported by validation; unknown fields are lost with it.
	if let Value::Object(extra) = record.entry("extra").or_insert_with(|| Value::Object(Map::new())) {
		for (key, value) in moved {
			extra.entry(key).or_insert(value);
		}
	}
	record
}

fn trim_string(record: &mut Record, field: &str, lowercase: bool) {
	if let Some(Value::String(s)) = record.get_mut(field) {
		let trimmed = s.trim();
		let next = if lowercase {
			trimmed.to_ascii_lowercase()
		} else {
			trimmed.to_string()
		};
		*s = next;
	}
}
