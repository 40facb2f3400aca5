//! Declarative field tables for provider and item records.
//!
//! A [`Schema`] drives two stages: validation checks each known field against
//! its [`FieldType`], and the merge engine reads each field's [`MergePolicy`].
//! Fields not listed in a schema (inside `extra`, or nested maps without a
//! sub-schema) fall back to [`default_policy`].

use serde_json::Value;

use crate::record::RecordKind;

/// How a field combines when several sources describe the same entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
	/// Incoming value replaces the existing one.
	Replace,
	/// Lists combine as an ordered set (first seen wins position).
	Union,
	/// Maps merge key by key; leaves absent from incoming are kept.
	DeepMerge,
}

/// Expected shape of a field's value.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
	String,
	Bool,
	/// Non-negative number.
	Number,
	StringList,
	/// Nested map whose leaves are numbers.
	NumberMap,
	/// Nested map whose leaves are booleans or numbers.
	Capabilities,
	/// Free-form map, optionally with its own field table.
	Object(Option<&'static Schema>),
}

impl FieldType {
	pub fn describe(self) -> &'static str {
		match self {
			Self::String => "string",
			Self::Bool => "boolean",
			Self::Number => "number",
			Self::StringList => "list of strings",
			Self::NumberMap => "map of numbers",
			Self::Capabilities => "capability tree",
			Self::Object(_) => "object",
		}
	}
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
	pub name: &'static str,
	pub ty: FieldType,
	pub policy: MergePolicy,
	pub required: bool,
}

const fn field(name: &'static str, ty: FieldType, policy: MergePolicy) -> FieldSpec {
	FieldSpec {
		name,
		ty,
		policy,
		required: false,
	}
}

const fn required(name: &'static str, ty: FieldType) -> FieldSpec {
	FieldSpec {
		name,
		ty,
		policy: MergePolicy::Replace,
		required: true,
	}
}

#[derive(Debug)]
pub struct Schema {
	pub name: &'static str,
	pub fields: &'static [FieldSpec],
}

impl Schema {
	/// Schema for the given record family.
	pub fn for_kind(kind: RecordKind) -> &'static Schema {
		match kind {
			RecordKind::Provider => &PROVIDER_SCHEMA,
			RecordKind::Item => &ITEM_SCHEMA,
		}
	}

	pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
		self.fields.iter().find(|f| f.name == name)
	}

	/// Returns true if `name` is a declared field.
	pub fn knows(&self, name: &str) -> bool {
		self.field(name).is_some()
	}
}

/// Policy for fields no schema describes: maps deep-merge, everything else replaces.
pub fn default_policy(value: &Value) -> MergePolicy {
	match value {
		Value::Object(_) => MergePolicy::DeepMerge,
		_ => MergePolicy::Replace,
	}
}

use FieldType as T;
use MergePolicy as P;

pub static PROVIDER_SCHEMA: Schema = Schema {
	name: "provider",
	fields: &[
		required("id", T::String),
		field("name", T::String, P::Replace),
		field("base_url", T::String, P::Replace),
		field("env", T::StringList, P::Replace),
		field("doc", T::String, P::Replace),
		field("extra", T::Object(None), P::DeepMerge),
	],
};

pub static MODALITIES_SCHEMA: Schema = Schema {
	name: "modalities",
	fields: &[
		field("input", T::StringList, P::Union),
		field("output", T::StringList, P::Union),
	],
};

pub static ITEM_SCHEMA: Schema = Schema {
	name: "item",
	fields: &[
		required("id", T::String),
		required("provider", T::String),
		field("provider_model_id", T::String, P::Replace),
		field("name", T::String, P::Replace),
		field("family", T::String, P::Replace),
		field("capabilities", T::Capabilities, P::DeepMerge),
		field("limits", T::NumberMap, P::DeepMerge),
		field("cost", T::NumberMap, P::DeepMerge),
		field("modalities", T::Object(Some(&MODALITIES_SCHEMA)), P::DeepMerge),
		field("aliases", T::StringList, P::Union),
		field("deprecated", T::Bool, P::Replace),
		field("extra", T::Object(None), P::DeepMerge),
	],
};
