//! The component registry.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use trellis_core::meta::ComponentMeta;

/// Ordered map from tag name to component metadata.
///
/// Tags keep the position of their first insertion; a later insert with the
/// same tag replaces the metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentRegistry {
	components: IndexMap<String, ComponentMeta>,
}

impl ComponentRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts `meta` under its tag name, returning the metadata it replaced.
	pub fn insert(&mut self, meta: ComponentMeta) -> Option<ComponentMeta> {
		self.components.insert(meta.tag_name.clone(), meta)
	}

	/// Looks up `tag_name`, falling back to its lowercased form as tags in
	/// markup may be any case.
	pub fn get(&self, tag_name: &str) -> Option<&ComponentMeta> {
		self.components
			.get(tag_name)
			.or_else(|| self.components.get(tag_name.to_ascii_lowercase().as_str()))
	}

	/// Case-insensitive membership check, same lookup as [`Self::get`].
	pub fn contains(&self, tag_name: &str) -> bool {
		self.get(tag_name).is_some()
	}

	pub fn len(&self) -> usize {
		self.components.len()
	}

	pub fn is_empty(&self) -> bool {
		self.components.is_empty()
	}

	/// Tag names in registration order.
	pub fn tags(&self) -> impl Iterator<Item = &str> {
		self.components.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &ComponentMeta)> {
		self.components.iter().map(|(tag, meta)| (tag.as_str(), meta))
	}
}

impl FromIterator<ComponentMeta> for ComponentRegistry {
	fn from_iter<I: IntoIterator<Item = ComponentMeta>>(iter: I) -> Self {
		let mut registry = Self::new();
		for meta in iter {
			registry.insert(meta);
		}
		registry
	}
}

impl Extend<ComponentMeta> for ComponentRegistry {
	fn extend<I: IntoIterator<Item = ComponentMeta>>(&mut self, iter: I) {
		for meta in iter {
			self.insert(meta);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_insert_same_tag_replaces_and_keeps_position() {
		// Arrange
		let mut registry = ComponentRegistry::new();
		registry.insert(ComponentMeta::new("ion-tabs").with_states(["a"]));
		registry.insert(ComponentMeta::new("ion-tab"));

		// Act
		let previous = registry.insert(ComponentMeta::new("ion-tabs").with_states(["b"]));

		// Assert
		assert_eq!(previous.unwrap().states(), ["a".to_string()]);
		assert_eq!(registry.len(), 2);
		assert_eq!(registry.tags().collect::<Vec<_>>(), ["ion-tabs", "ion-tab"]);
		assert_eq!(registry.get("ion-tabs").unwrap().states(), ["b".to_string()]);
	}

	#[rstest]
	#[case("ion-tab", true)]
	#[case("ION-TAB", true)]
	#[case("ion-tabs", false)]
	fn test_contains_ignores_case(#[case] tag: &str, #[case] expected: bool) {
		let registry: ComponentRegistry = [ComponentMeta::new("ion-tab")].into_iter().collect();

		assert_eq!(registry.contains(tag), expected);
	}

	#[rstest]
	fn test_get_matches_contains_for_uppercase_markup() {
		let registry: ComponentRegistry = [ComponentMeta::new("ion-tab")].into_iter().collect();

		let meta = registry.get("ION-TAB").unwrap();

		assert_eq!(meta.tag_name, "ion-tab");
		assert!(registry.get("ion-tabs").is_none());
	}

	#[rstest]
	fn test_serializes_as_tag_map() {
		let registry: ComponentRegistry = [ComponentMeta::new("ion-tab")].into_iter().collect();

		let json = serde_json::to_value(&registry).unwrap();

		assert_eq!(json["ion-tab"]["tagName"], "ion-tab");
	}
}
