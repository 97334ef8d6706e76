//! Registry error types.

use thiserror::Error;
use trellis_core::sys::FsError;

/// Result type for registry loading.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// A registry that could not be loaded.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
	/// The registry file could not be read.
	#[error("Unable to open component registry: {0}")]
	Read(#[from] FsError),

	/// The registry file is not valid JSON.
	#[error("Unable to open component registry: {0}")]
	Json(#[from] serde_json::Error),

	/// The registry data holds no usable component.
	#[error("Unable to open component registry: No components were found within the registry data")]
	NoComponents,
}

/// A single compact record that could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RecordError {
	#[error("record is not an array")]
	NotAnArray,

	#[error("record has no tag name")]
	MissingTag,

	#[error("invalid {field}: {reason}")]
	InvalidField {
		/// Position name within the record.
		field: &'static str,
		reason: String,
	},
}

impl RecordError {
	pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
		Self::InvalidField {
			field,
			reason: reason.into(),
		}
	}
}
