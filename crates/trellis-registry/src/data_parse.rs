//! Compact registry record normalization.
//!
//! The build writes each component as a positional JSON array:
//!
//! ```text
//! [tag, bundleIds, hasStyles, [[member, memberType, propType?], ...], encapsulation, [[event, method, capture?, passive?], ...]]
//! ```
//!
//! Trailing positions may be omitted and `null` means absent.

use crate::error::RecordError;
use crate::registry::ComponentRegistry;
use serde_json::Value;
use std::collections::BTreeMap;
use trellis_core::meta::{BundleIds, ComponentMeta, Encapsulation, ListenerMeta, PropType};

const TAG_NAME: usize = 0;
const BUNDLE_IDS: usize = 1;
const HAS_STYLES: usize = 2;
const MEMBERS: usize = 3;
const ENCAPSULATION: usize = 4;
const LISTENERS: usize = 5;

const MEMBER_PROP: u64 = 1;
const MEMBER_PROP_MUTABLE: u64 = 2;
const MEMBER_PROP_CONTEXT: u64 = 3;
const MEMBER_PROP_CONNECT: u64 = 4;
const MEMBER_STATE: u64 = 5;
const MEMBER_METHOD: u64 = 6;
const MEMBER_ELEMENT_REF: u64 = 7;

/// Normalizes one compact record and folds it into `registry`.
///
/// A record whose tag is already registered replaces the earlier entry.
pub fn parse_component_registry(
	record: &Value,
	registry: &mut ComponentRegistry,
) -> Result<(), RecordError> {
	let meta = parse_component_meta(record)?;
	registry.insert(meta);
	Ok(())
}

/// Normalizes one compact record into component metadata.
pub fn parse_component_meta(record: &Value) -> Result<ComponentMeta, RecordError> {
	let fields = record.as_array().ok_or(RecordError::NotAnArray)?;

	let tag_name = match position(fields, TAG_NAME) {
		None => return Err(RecordError::MissingTag),
		Some(Value::String(tag)) if tag.trim().is_empty() => return Err(RecordError::MissingTag),
		Some(Value::String(tag)) => tag.trim().to_ascii_lowercase(),
		Some(other) => {
			return Err(RecordError::invalid(
				"tag name",
				format!("expected string, got {}", kind(other)),
			));
		}
	};

	let mut meta = ComponentMeta::new(tag_name);
	meta.bundle_ids = parse_bundle_ids(position(fields, BUNDLE_IDS))?;
	meta.has_styles = match position(fields, HAS_STYLES) {
		Some(value) => parse_flag("has styles", value)?,
		None => false,
	};
	parse_members(&mut meta, position(fields, MEMBERS))?;
	meta.encapsulation = parse_encapsulation(position(fields, ENCAPSULATION))?;
	meta.listeners_meta = parse_listeners(position(fields, LISTENERS))?;

	Ok(meta)
}

fn position(fields: &[Value], index: usize) -> Option<&Value> {
	fields.get(index).filter(|value| !value.is_null())
}

fn kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

fn parse_flag(field: &'static str, value: &Value) -> Result<bool, RecordError> {
	match value {
		Value::Bool(flag) => Ok(*flag),
		Value::Number(n) => match n.as_u64() {
			Some(0) => Ok(false),
			Some(1) => Ok(true),
			_ => Err(RecordError::invalid(field, format!("expected 0 or 1, got {n}"))),
		},
		other => Err(RecordError::invalid(
			field,
			format!("expected bool, got {}", kind(other)),
		)),
	}
}

fn parse_bundle_ids(value: Option<&Value>) -> Result<Option<BundleIds>, RecordError> {
	match value {
		None => Ok(None),
		Some(Value::String(id)) => Ok(Some(BundleIds::Single(id.clone()))),
		Some(Value::Object(modes)) => {
			let mut ids = BTreeMap::new();
			for (mode, id) in modes {
				let id = id.as_str().ok_or_else(|| {
					RecordError::invalid("bundle ids", format!("mode '{mode}' has a non-string id"))
				})?;
				ids.insert(mode.clone(), id.to_string());
			}
			Ok(Some(BundleIds::PerMode(ids)))
		}
		Some(other) => Err(RecordError::invalid(
			"bundle ids",
			format!("expected string or object, got {}", kind(other)),
		)),
	}
}

fn parse_encapsulation(value: Option<&Value>) -> Result<Encapsulation, RecordError> {
	let Some(value) = value else {
		return Ok(Encapsulation::None);
	};
	match value.as_u64() {
		Some(0) => Ok(Encapsulation::None),
		Some(1) => Ok(Encapsulation::Shadow),
		Some(2) => Ok(Encapsulation::Scoped),
		_ => Err(RecordError::invalid(
			"encapsulation",
			format!("expected 0, 1 or 2, got {value}"),
		)),
	}
}

fn parse_prop_type(name: &str, value: &Value) -> Result<PropType, RecordError> {
	match value.as_u64() {
		Some(0) => Ok(PropType::Any),
		Some(1) => Ok(PropType::String),
		Some(2) => Ok(PropType::Number),
		Some(3) => Ok(PropType::Boolean),
		_ => Err(RecordError::invalid(
			"prop type",
			format!("unknown prop type {value} for '{name}'"),
		)),
	}
}

fn parse_members(meta: &mut ComponentMeta, value: Option<&Value>) -> Result<(), RecordError> {
	let Some(value) = value else {
		return Ok(());
	};
	let members = value.as_array().ok_or_else(|| {
		RecordError::invalid("members", format!("expected array, got {}", kind(value)))
	})?;

	let mut props = Vec::new();
	let mut states = Vec::new();
	let mut methods = Vec::new();

	for member in members {
		let entry = member
			.as_array()
			.ok_or_else(|| RecordError::invalid("members", "member is not an array"))?;
		let name = match entry.first() {
			Some(Value::String(name)) if !name.is_empty() => name.clone(),
			_ => return Err(RecordError::invalid("members", "member has no name")),
		};
		let member_type = entry.get(1).and_then(Value::as_u64).ok_or_else(|| {
			RecordError::invalid("members", format!("member '{name}' has no member type"))
		})?;

		match member_type {
			MEMBER_PROP | MEMBER_PROP_MUTABLE | MEMBER_PROP_CONTEXT | MEMBER_PROP_CONNECT => {
				if let Some(prop_type) = position(entry, 2) {
					let prop_type = parse_prop_type(&name, prop_type)?;
					meta.prop_types.insert(name.clone(), prop_type);
				}
				props.push(name);
			}
			MEMBER_STATE => states.push(name),
			MEMBER_METHOD => methods.push(name),
			MEMBER_ELEMENT_REF => meta.host_element_member = Some(name),
			other => {
				return Err(RecordError::invalid(
					"member type",
					format!("unknown member type {other} for '{name}'"),
				));
			}
		}
	}

	if !props.is_empty() {
		meta.props_meta = Some(props);
	}
	if !states.is_empty() {
		meta.states_meta = Some(states);
	}
	if !methods.is_empty() {
		meta.methods_meta = Some(methods);
	}
	Ok(())
}

fn parse_listeners(value: Option<&Value>) -> Result<Vec<ListenerMeta>, RecordError> {
	let Some(value) = value else {
		return Ok(Vec::new());
	};
	let listeners = value.as_array().ok_or_else(|| {
		RecordError::invalid("listeners", format!("expected array, got {}", kind(value)))
	})?;

	listeners
		.iter()
		.map(|listener| {
			let entry = listener
				.as_array()
				.ok_or_else(|| RecordError::invalid("listeners", "listener is not an array"))?;
			let (Some(event_name), Some(event_method)) = (
				entry.first().and_then(Value::as_str),
				entry.get(1).and_then(Value::as_str),
			) else {
				return Err(RecordError::invalid(
					"listeners",
					"listener needs an event name and a method",
				));
			};
			let capture = match position(entry, 2) {
				Some(flag) => parse_flag("listener capture", flag)?,
				None => false,
			};
			let passive = match position(entry, 3) {
				Some(flag) => parse_flag("listener passive", flag)?,
				None => false,
			};
			Ok(ListenerMeta {
				event_name: event_name.to_string(),
				event_method: event_method.to_string(),
				capture,
				passive,
			})
		})
		.collect()
}
