use serde_json::{Value, json};

use super::*;
use crate::schema::{ITEM_SCHEMA, PROVIDER_SCHEMA};

fn record(value: Value) -> Record {
	match value {
		Value::Object(map) => map,
		_ => unreachable!("fixture must be an object"),
	}
}

#[test]
fn test_valid_item_passes_unchanged() {
	let input = record(json!({
		"id": "gpt-4",
		"provider": "openai",
		"aliases": ["gpt4"],
		"capabilities": {"chat": true, "tools": {"enabled": true, "max": 128}},
		"cost": {"input": 30.0, "output": 60.0},
		"modalities": {"input": ["text", "image"]},
	}));
	let out = SchemaValidator.validate(&ITEM_SCHEMA, input.clone()).unwrap();
	assert_eq!(out, input);
}

#[test]
fn test_missing_required_fields_are_all_reported() {
	let err = SchemaValidator.validate(&ITEM_SCHEMA, record(json!({"name": "x"}))).unwrap_err();
	assert_eq!(err, vec![Violation::Missing("id"), Violation::Missing("provider")]);
}

#[test]
fn test_shape_violations_carry_dotted_paths() {
	let err = SchemaValidator
		.validate(
			&ITEM_SCHEMA,
			record(json!({
				"id": "m",
				"provider": "openai",
				"cost": {"input": -1.0},
				"modalities": {"input": "text"},
				"capabilities": {"tools": {"enabled": "yes"}},
			})),
		)
		.unwrap_err();
	let fields: Vec<String> = err
		.iter()
		.map(|v| match v {
			Violation::Type { field, .. } | Violation::Negative { field, .. } => field.clone(),
			other => panic!("unexpected violation {other:?}"),
		})
		.collect();
	assert_eq!(fields, ["capabilities.tools.enabled", "cost.input", "modalities.input"]);
}

#[test]
fn test_empty_provider_id_is_rejected() {
	let err = SchemaValidator.validate(&PROVIDER_SCHEMA, record(json!({"id": ""}))).unwrap_err();
	assert_eq!(err, vec![Violation::Empty("id".into())]);
}

#[test]
fn test_validation_error_display_lists_violations() {
	let rec = record(json!({"id": "m"}));
	let err = ValidationError::new(RecordKind::Item, &rec, vec![Violation::Missing("provider")]);
	assert_eq!(err.to_string(), "invalid item `m`: missing required field `provider`");
}
