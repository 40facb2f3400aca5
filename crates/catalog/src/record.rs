//! Canonical record maps as produced by source adapters.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One untyped record: field name to JSON value.
pub type Record = Map<String, Value>;

/// Everything one source contributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
	#[serde(default)]
	pub providers: Vec<Record>,
	#[serde(default)]
	pub items: Vec<Record>,
}

impl RecordSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a provider record. Non-object values are ignored.
	pub fn with_provider(mut self, record: Value) -> Self {
		if let Value::Object(map) = record {
			self.providers.push(map);
		}
		self
	}

	/// Adds an item record. Non-object values are ignored.
	pub fn with_item(mut self, record: Value) -> Self {
		if let Value::Object(map) = record {
			self.items.push(map);
		}
		self
	}

	pub fn is_empty(&self) -> bool {
		self.providers.is_empty() && self.items.is_empty()
	}
}

/// Which of the two record families a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
	Provider,
	Item,
}

impl fmt::Display for RecordKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Provider => f.write_str("provider"),
			Self::Item => f.write_str("item"),
		}
	}
}

/// Returns the string at `field`, if present.
pub(crate) fn str_field<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
	record.get(field).and_then(Value::as_str)
}
