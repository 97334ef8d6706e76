//! Registry file loading.

use crate::data_parse::parse_component_registry;
use crate::error::{RegistryError, RegistryResult};
use crate::registry::ComponentRegistry;
use serde_json::Value;
use std::path::Path;
use trellis_core::sys::FileSystem;

/// Reads and normalizes the registry file at `path`.
///
/// Fails if the file cannot be read, is not JSON, or holds no usable
/// component record. Malformed records are skipped with a warning.
pub fn load_registry(fs: &dyn FileSystem, path: &Path) -> RegistryResult<ComponentRegistry> {
	tracing::debug!(path = %path.display(), "loading component registry");

	let data = fs.read_to_string(path)?;
	let registry = parse_registry_json(&data)?;

	tracing::info!(
		path = %path.display(),
		components = registry.len(),
		"loaded component registry"
	);
	Ok(registry)
}

/// Normalizes registry data that has already been read.
pub fn parse_registry_json(data: &str) -> RegistryResult<ComponentRegistry> {
	let data: Value = serde_json::from_str(data)?;

	let records = data
		.get("components")
		.and_then(Value::as_array)
		.filter(|records| !records.is_empty())
		.ok_or(RegistryError::NoComponents)?;

	let mut registry = ComponentRegistry::new();
	for (index, record) in records.iter().enumerate() {
		if let Err(reason) = parse_component_registry(record, &mut registry) {
			tracing::warn!(index, %reason, "skipping component registry record");
		}
	}

	if registry.is_empty() {
		return Err(RegistryError::NoComponents);
	}
	Ok(registry)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::path::PathBuf;
	use trellis_core::sys::{MemoryFileSystem, OsFileSystem};

	#[rstest]
	#[case(r#"{"components": []}"#)]
	#[case(r#"{}"#)]
	#[case(r#"{"components": {"ion-tab": []}}"#)]
	#[case(r#"[]"#)]
	fn test_no_components(#[case] data: &str) {
		let err = parse_registry_json(data).unwrap_err();

		assert!(matches!(err, RegistryError::NoComponents));
		assert!(err.to_string().contains("No components were found within the registry data"));
	}

	#[rstest]
	fn test_only_malformed_records_is_no_components() {
		let err = parse_registry_json(r#"{"components": [42, [null]]}"#).unwrap_err();

		assert!(matches!(err, RegistryError::NoComponents));
	}

	#[rstest]
	fn test_malformed_record_is_skipped() {
		// Arrange
		let data = r#"{"components": [["ion-tab"], "garbage", ["ion-tabs", null, 0, [["selectedTab", 5]]]]}"#;

		// Act
		let registry = parse_registry_json(data).unwrap();

		// Assert
		assert_eq!(registry.tags().collect::<Vec<_>>(), ["ion-tab", "ion-tabs"]);
		assert_eq!(
			registry.get("ion-tabs").unwrap().states(),
			["selectedTab".to_string()]
		);
	}

	#[rstest]
	fn test_duplicate_tags_last_wins() {
		let data = r#"{"components": [["ion-tab", "first", 0], ["ion-tab", "second", 1]]}"#;

		let registry = parse_registry_json(data).unwrap();

		assert_eq!(registry.len(), 1);
		assert!(registry.get("ion-tab").unwrap().has_styles);
	}

	#[rstest]
	fn test_invalid_json() {
		let err = parse_registry_json("{not json").unwrap_err();

		assert!(matches!(err, RegistryError::Json(_)));
		assert!(err.to_string().starts_with("Unable to open component registry: "));
	}

	#[rstest]
	fn test_missing_file() {
		let fs = MemoryFileSystem::new();

		let err = load_registry(&fs, Path::new("/www/build/app.registry.json")).unwrap_err();

		assert!(matches!(err, RegistryError::Read(_)));
		assert!(err.to_string().contains("Unable to open component registry"));
	}

	#[rstest]
	fn test_load_from_memory() {
		let fs = MemoryFileSystem::new();
		let path = PathBuf::from("/www/build/app.registry.json");
		fs.write(&path, r#"{"components": [["ion-tab"]]}"#);

		let registry = load_registry(&fs, &path).unwrap();

		assert!(registry.contains("ion-tab"));
	}

	#[rstest]
	fn test_load_from_disk() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("app.registry.json");
		std::fs::write(&path, r#"{"components": [["ion-tabs"], ["ion-tab"]]}"#).unwrap();

		let registry = load_registry(&OsFileSystem, &path).unwrap();

		assert_eq!(registry.len(), 2);
	}
}
