//! Record validation against a [`Schema`].
//!
//! The pipeline treats validation as a pure function: a record either comes
//! back (possibly rewritten) or is rejected with every violation found. The
//! [`Validator`] trait is the seam for plugging in an external schema engine;
//! [`SchemaValidator`] checks the built-in field tables.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::record::{Record, RecordKind, str_field};
use crate::schema::{FieldSpec, FieldType, Schema};

#[cfg(test)]
mod tests;

/// One reason a record was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
	#[error("missing required field `{0}`")]
	Missing(&'static str),
	#[error("field `{field}` must be a {expected}, found {found}")]
	Type {
		field: String,
		expected: &'static str,
		found: &'static str,
	},
	#[error("field `{0}` must not be empty")]
	Empty(String),
	#[error("field `{field}` must not be negative, found {value}")]
	Negative { field: String, value: f64 },
	#[error("unknown provider `{0}`")]
	UnknownProvider(String),
	#[error("record does not fit the model: {0}")]
	Shape(String),
}

/// A record dropped by validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
	pub kind: RecordKind,
	pub id: Option<String>,
	pub violations: Vec<Violation>,
}

impl ValidationError {
	pub fn new(kind: RecordKind, record: &Record, violations: Vec<Violation>) -> Self {
		Self {
			kind,
			id: str_field(record, "id").map(str::to_string),
			violations,
		}
	}
}

impl fmt::Display for ValidationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "invalid {} `{}`: ", self.kind, self.id.as_deref().unwrap_or("<no id>"))?;
		for (i, violation) in self.violations.iter().enumerate() {
			if i > 0 {
				f.write_str("; ")?;
			}
			write!(f, "{violation}")?;
		}
		Ok(())
	}
}

impl std::error::Error for ValidationError {}

/// Checks a record against a schema.
pub trait Validator: Send + Sync {
	/// Returns the accepted record, or every violation found.
	fn validate(&self, schema: &'static Schema, record: Record) -> Result<Record, Vec<Violation>>;
}

/// Validator for the built-in field tables.
///
/// Checks presence of required fields and the shape of every known field.
/// Unknown fields pass untouched; defaults are not injected here because an
/// injected default would overwrite real values from earlier sources during
/// merge. Defaults are applied after merge by the enricher.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl Validator for SchemaValidator {
	fn validate(&self, schema: &'static Schema, record: Record) -> Result<Record, Vec<Violation>> {
		let mut violations = Vec::new();
		check_fields(schema, &record, "", &mut violations);
		if violations.is_empty() {
			Ok(record)
		} else {
			Err(violations)
		}
	}
}

fn check_fields(schema: &Schema, record: &Record, prefix: &str, out: &mut Vec<Violation>) {
	for spec in schema.fields {
		match record.get(spec.name) {
			None if spec.required => out.push(Violation::Missing(spec.name)),
			None => {}
			Some(value) => check_field(spec, value, &join(prefix, spec.name), out),
		}
	}
}

fn check_field(spec: &FieldSpec, value: &Value, path: &str, out: &mut Vec<Violation>) {
	match spec.ty {
		FieldType::String => match value.as_str() {
			Some(s) if spec.required && s.is_empty() => out.push(Violation::Empty(path.to_string())),
			Some(_) => {}
			None => out.push(type_violation(path, spec.ty, value)),
		},
		FieldType::Bool => {
			if !value.is_boolean() {
				out.push(type_violation(path, spec.ty, value));
			}
		}
		FieldType::Number => check_number(path, value, out),
		FieldType::StringList => match value.as_array() {
			Some(list) if list.iter().all(Value::is_string) => {}
			_ => out.push(type_violation(path, spec.ty, value)),
		},
		FieldType::NumberMap => match value.as_object() {
			Some(map) => {
				for (key, leaf) in map {
					check_number(&join(path, key), leaf, out);
				}
			}
			None => out.push(type_violation(path, spec.ty, value)),
		},
		FieldType::Capabilities => check_capabilities(path, value, out),
		FieldType::Object(nested) => match (value.as_object(), nested) {
			(Some(map), Some(schema)) => check_fields(schema, map, path, out),
			(Some(_), None) => {}
			(None, _) => out.push(type_violation(path, spec.ty, value)),
		},
	}
}

fn check_number(path: &str, value: &Value, out: &mut Vec<Violation>) {
	match value.as_f64() {
		Some(n) if n < 0.0 => out.push(Violation::Negative {
			field: path.to_string(),
			value: n,
		}),
		Some(_) => {}
		None => out.push(type_violation(path, FieldType::Number, value)),
	}
}

fn check_capabilities(path: &str, value: &Value, out: &mut Vec<Violation>) {
	let Some(map) = value.as_object() else {
		out.push(type_violation(path, FieldType::Capabilities, value));
		return;
	};
	for (key, leaf) in map {
		let leaf_path = join(path, key);
		match leaf {
			Value::Bool(_) | Value::Number(_) => {}
			Value::Object(_) => check_capabilities(&leaf_path, leaf, out),
			other => out.push(Violation::Type {
				field: leaf_path,
				expected: "boolean, number or nested capabilities",
				found: json_type(other),
			}),
		}
	}
}

fn type_violation(path: &str, ty: FieldType, value: &Value) -> Violation {
	Violation::Type {
		field: path.to_string(),
		expected: ty.describe(),
		found: json_type(value),
	}
}

fn json_type(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

fn join(prefix: &str, name: &str) -> String {
	if prefix.is_empty() {
		name.to_string()
	} else {
		format!("{prefix}.{name}")
	}
}
