//! Typed provider and item records.
//!
//! Records travel through normalize/validate/merge as untyped maps and are
//! converted to these types once merged. Each type keeps a catch-all `extra`
//! map for upstream fields it does not model.

mod capabilities;

use std::collections::BTreeMap;

use llmdb_primitives::{ItemRef, ProviderId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub use self::capabilities::{Capabilities, CapabilityValue};
use crate::record::Record;

/// An organization offering items (e.g. an API vendor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
	pub id: ProviderId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub base_url: Option<String>,
	/// Environment variables that carry credentials for this provider.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub env: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub doc: Option<String>,
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub extra: Map<String, Value>,
}

impl Provider {
	pub fn from_record(record: Record) -> Result<Self, serde_json::Error> {
		serde_json::from_value(Value::Object(record))
	}

	/// Display name, falling back to the id.
	pub fn display_name(&self) -> &str {
		self.name.as_deref().unwrap_or(self.id.as_str())
	}
}

/// Numeric bounds keyed by dimension (`context`, `output`, `max_images`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Limits(BTreeMap<String, Number>);

impl Limits {
	pub fn get(&self, key: &str) -> Option<f64> {
		self.0.get(key).and_then(Number::as_f64)
	}

	/// Integral reading of `key`; `128000` and `128000.0` are the same bound.
	pub fn bound(&self, key: &str) -> Option<u64> {
		let n = self.0.get(key)?;
		n.as_u64().or_else(|| {
			n.as_f64()
				.filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
				.map(|f| f as u64)
		})
	}

	pub fn context(&self) -> Option<u64> {
		self.bound("context")
	}

	pub fn output(&self) -> Option<u64> {
		self.bound("output")
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Per-unit prices keyed by dimension (`input`, `output`, `cache_read`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cost(BTreeMap<String, f64>);

impl Cost {
	pub fn get(&self, key: &str) -> Option<f64> {
		self.0.get(key).copied()
	}

	pub fn input(&self) -> Option<f64> {
		self.get("input")
	}

	pub fn output(&self) -> Option<f64> {
		self.get("output")
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Input and output modality tags (`text`, `image`, `audio`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Modalities {
	#[serde(default)]
	pub input: Vec<String>,
	#[serde(default)]
	pub output: Vec<String>,
}

impl Modalities {
	pub fn is_empty(&self) -> bool {
		self.input.is_empty() && self.output.is_empty()
	}
}

/// A single cataloged entity, typically a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
	pub id: String,
	pub provider: ProviderId,
	/// Identifier to send to the provider's API; defaults to `id`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub provider_model_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub family: Option<String>,
	#[serde(default, skip_serializing_if = "Capabilities::is_empty")]
	pub capabilities: Capabilities,
	#[serde(default, skip_serializing_if = "Limits::is_empty")]
	pub limits: Limits,
	#[serde(default, skip_serializing_if = "Cost::is_empty")]
	pub cost: Cost,
	#[serde(default, skip_serializing_if = "Modalities::is_empty")]
	pub modalities: Modalities,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub aliases: Vec<String>,
	#[serde(default)]
	pub deprecated: bool,
	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub extra: Map<String, Value>,
}

impl Item {
	pub fn from_record(record: Record) -> Result<Self, serde_json::Error> {
		serde_json::from_value(Value::Object(record))
	}

	/// `(provider, id)` handle for this item.
	pub fn item_ref(&self) -> ItemRef {
		ItemRef::new(self.provider.clone(), self.id.clone())
	}

	/// Spec string form, `"<provider>:<id>"`.
	pub fn spec(&self) -> String {
		format!("{}:{}", self.provider, self.id)
	}
}
