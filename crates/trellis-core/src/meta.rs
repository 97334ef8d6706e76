//! Component metadata.
//!
//! Metadata is produced by the compiler (or by the registry normalizer) and is
//! immutable afterwards. The proxy installer only ever borrows it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a single instance field is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
	/// A plain value owned by the instance.
	Stored,
	/// An accessor backed by the host element's state store.
	Reactive,
}

/// One entry of a static field table emitted for a component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
	/// Field name.
	pub name: &'static str,
	/// Storage kind of the field.
	pub kind: FieldKind,
}

impl FieldSpec {
	/// A plain stored field.
	pub const fn stored(name: &'static str) -> Self {
		Self {
			name,
			kind: FieldKind::Stored,
		}
	}

	/// A reactive state field.
	pub const fn reactive(name: &'static str) -> Self {
		Self {
			name,
			kind: FieldKind::Reactive,
		}
	}
}

/// Declared type of a prop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropType {
	#[default]
	Any,
	String,
	Number,
	Boolean,
}

/// Style encapsulation of a component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encapsulation {
	#[default]
	None,
	Shadow,
	Scoped,
}

/// Bundle ids a component's code lives in, either one id or one per mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BundleIds {
	Single(String),
	PerMode(BTreeMap<String, String>),
}

impl BundleIds {
	/// Returns the bundle id for `mode`, falling back to the `$` default mode.
	pub fn for_mode(&self, mode: &str) -> Option<&str> {
		match self {
			Self::Single(id) => Some(id),
			Self::PerMode(map) => map
				.get(mode)
				.or_else(|| map.get("$"))
				.map(String::as_str),
		}
	}
}

/// An event listener declared on a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerMeta {
	/// Event name, e.g. `ionTabDidLoad`.
	pub event_name: String,
	/// Instance method receiving the event.
	pub event_method: String,
	#[serde(default)]
	pub capture: bool,
	#[serde(default)]
	pub passive: bool,
}

/// Metadata describing one component type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMeta {
	/// Tag name, unique within a registry.
	pub tag_name: String,

	/// Declared state fields, in declaration order.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub states_meta: Option<Vec<String>>,

	/// Declared prop fields, in declaration order.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub props_meta: Option<Vec<String>>,

	/// Declared type of each prop.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub prop_types: BTreeMap<String, PropType>,

	/// Public methods exposed on the host element.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub methods_meta: Option<Vec<String>>,

	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub listeners_meta: Vec<ListenerMeta>,

	/// Instance field that receives the host element.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub host_element_member: Option<String>,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bundle_ids: Option<BundleIds>,

	#[serde(default)]
	pub has_styles: bool,

	#[serde(default)]
	pub encapsulation: Encapsulation,
}

impl ComponentMeta {
	/// Creates metadata for `tag_name` with no declared fields.
	pub fn new(tag_name: impl Into<String>) -> Self {
		Self {
			tag_name: tag_name.into(),
			..Self::default()
		}
	}

	/// Builds metadata from a static field table.
	///
	/// Reactive entries become `states_meta` in table order. Stored entries are
	/// not recorded, since stored is the default for every field.
	pub fn from_fields(tag_name: impl Into<String>, fields: &[FieldSpec]) -> Self {
		let states: Vec<String> = fields
			.iter()
			.filter(|f| f.kind == FieldKind::Reactive)
			.map(|f| f.name.to_string())
			.collect();

		let mut meta = Self::new(tag_name);
		if !states.is_empty() {
			meta.states_meta = Some(states);
		}
		meta
	}

	/// Sets the declared state fields.
	pub fn with_states<I, S>(mut self, states: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.states_meta = Some(states.into_iter().map(Into::into).collect());
		self
	}

	/// Sets the declared prop fields.
	pub fn with_props<I, S>(mut self, props: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.props_meta = Some(props.into_iter().map(Into::into).collect());
		self
	}

	/// Sets the field receiving the host element.
	pub fn with_host_element_member(mut self, member: impl Into<String>) -> Self {
		self.host_element_member = Some(member.into());
		self
	}

	/// Declared state fields, empty when none were declared.
	pub fn states(&self) -> &[String] {
		self.states_meta.as_deref().unwrap_or_default()
	}

	/// Declared prop fields, empty when none were declared.
	pub fn props(&self) -> &[String] {
		self.props_meta.as_deref().unwrap_or_default()
	}

	/// Returns how `field` is stored on an instance of this component.
	pub fn field_kind(&self, field: &str) -> FieldKind {
		if self.states().iter().any(|s| s == field) {
			FieldKind::Reactive
		} else {
			FieldKind::Stored
		}
	}

	/// Returns `true` if `field` is a declared prop.
	pub fn is_prop(&self, field: &str) -> bool {
		self.props().iter().any(|p| p == field)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_field_kind_follows_states_meta() {
		// Arrange
		let meta = ComponentMeta::new("ion-tabs")
			.with_states(["selectedTab", "tabs"])
			.with_props(["tabsPlacement"]);

		// Act & Assert
		assert_eq!(meta.field_kind("selectedTab"), FieldKind::Reactive);
		assert_eq!(meta.field_kind("tabs"), FieldKind::Reactive);
		assert_eq!(meta.field_kind("tabsPlacement"), FieldKind::Stored);
		assert_eq!(meta.field_kind("undeclared"), FieldKind::Stored);
	}

	#[rstest]
	fn test_missing_states_meta_means_all_stored() {
		let meta = ComponentMeta::new("ion-cmp");

		assert!(meta.states().is_empty());
		assert_eq!(meta.field_kind("state"), FieldKind::Stored);
	}

	#[rstest]
	fn test_from_fields_keeps_reactive_order() {
		// Arrange
		const FIELDS: &[FieldSpec] = &[
			FieldSpec::reactive("b"),
			FieldSpec::stored("x"),
			FieldSpec::reactive("a"),
		];

		// Act
		let meta = ComponentMeta::from_fields("my-cmp", FIELDS);

		// Assert
		assert_eq!(meta.states(), ["b".to_string(), "a".to_string()]);
		assert_eq!(meta.field_kind("x"), FieldKind::Stored);
	}

	#[rstest]
	fn test_from_fields_without_reactive_fields_has_no_states_meta() {
		let meta = ComponentMeta::from_fields("my-cmp", &[FieldSpec::stored("x")]);

		assert!(meta.states_meta.is_none());
	}

	#[rstest]
	#[case("ios", Some("b-ios"))]
	#[case("md", Some("b-default"))]
	fn test_bundle_ids_per_mode_falls_back_to_default(
		#[case] mode: &str,
		#[case] expected: Option<&str>,
	) {
		let ids = BundleIds::PerMode(BTreeMap::from([
			("ios".to_string(), "b-ios".to_string()),
			("$".to_string(), "b-default".to_string()),
		]));

		assert_eq!(ids.for_mode(mode), expected);
	}

	#[rstest]
	fn test_meta_serializes_camel_case() {
		let meta = ComponentMeta::new("ion-cmp").with_states(["count"]);

		let json = serde_json::to_value(&meta).unwrap();

		assert_eq!(json["tagName"], "ion-cmp");
		assert_eq!(json["statesMeta"], serde_json::json!(["count"]));
		assert!(json.get("propsMeta").is_none());
	}
}
