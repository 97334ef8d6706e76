//! Renderer error types.

use std::path::PathBuf;
use thiserror::Error;
use trellis_core::sys::UrlError;
use trellis_registry::RegistryError;

/// Result type for renderer construction.
pub type RendererResult<T> = Result<T, RendererError>;

/// Invalid or unreadable build configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
	#[error("failed to read config file {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("required setting '{0}' is missing")]
	MissingRequired(&'static str),

	#[error("invalid value for '{key}': {message}")]
	InvalidValue { key: &'static str, message: String },
}

/// A failure while hydrating one request.
///
/// Never returned to callers; the renderer turns it into a diagnostic.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HydrateError {
	#[error(transparent)]
	Url(#[from] UrlError),

	#[error("{0}")]
	Engine(String),

	#[error("panicked: {0}")]
	Panicked(String),

	/// The render task was dropped before it completed.
	#[error("hydration cancelled")]
	Cancelled,
}

impl HydrateError {
	pub fn engine(message: impl Into<String>) -> Self {
		Self::Engine(message.into())
	}
}

/// Renderer construction failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RendererError {
	#[error("invalid build config: {0}")]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Registry(#[from] RegistryError),
}
