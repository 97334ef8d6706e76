//! Build configuration.
//!
//! [`BuildConfig`] locates the build output the renderer reads (the
//! component registry and the app global script) and carries the runtime
//! capabilities. The serializable part loads from TOML:
//!
//! ```toml
//! root_dir = "/srv/app"
//! www_dir = "www"
//! build_dir = "build"
//! namespace = "Ionic"
//! log_level = "debug"
//! ```

use crate::error::ConfigError;
use crate::logger::{LogLevel, Logger};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use trellis_core::sys::Sys;

/// Renderer build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
	/// Project root, all other directories are relative to it.
	pub root_dir: PathBuf,
	/// Public output directory, relative to `root_dir`.
	pub www_dir: PathBuf,
	/// Build output directory, relative to `www_dir`.
	pub build_dir: PathBuf,
	/// App namespace; names the registry and global files.
	pub namespace: String,
	pub log_level: LogLevel,
	pub dev_mode: bool,

	/// Host capabilities. Filled with the OS defaults by the renderer.
	#[serde(skip)]
	pub sys: Option<Sys>,

	/// Logger handle. Created from `log_level` by the renderer.
	#[serde(skip)]
	pub logger: Option<Logger>,
}

impl Default for BuildConfig {
	fn default() -> Self {
		Self {
			root_dir: PathBuf::from("."),
			www_dir: PathBuf::from("www"),
			build_dir: PathBuf::from("build"),
			namespace: "App".to_string(),
			log_level: LogLevel::Info,
			dev_mode: false,
			sys: None,
			logger: None,
		}
	}
}

impl BuildConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses the serializable settings from TOML. Missing keys keep their
	/// defaults.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	/// Reads and parses a TOML settings file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&source)
	}

	pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
		self.root_dir = root_dir.into();
		self
	}

	pub fn with_www_dir(mut self, www_dir: impl Into<PathBuf>) -> Self {
		self.www_dir = www_dir.into();
		self
	}

	pub fn with_build_dir(mut self, build_dir: impl Into<PathBuf>) -> Self {
		self.build_dir = build_dir.into();
		self
	}

	pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
		self.namespace = namespace.into();
		self
	}

	pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
		self.log_level = log_level;
		self
	}

	pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
		self.dev_mode = dev_mode;
		self
	}

	pub fn with_sys(mut self, sys: Sys) -> Self {
		self.sys = Some(sys);
		self
	}

	pub fn with_logger(mut self, logger: Logger) -> Self {
		self.logger = Some(logger);
		self
	}

	/// The configured capabilities, or the OS defaults.
	pub fn sys_or_default(&self) -> Sys {
		self.sys.clone().unwrap_or_default()
	}

	/// The configured logger, or one at `log_level`.
	pub fn logger_or_default(&self) -> Logger {
		self.logger.unwrap_or_else(|| Logger::new(self.log_level))
	}

	pub fn resolved_www_dir(&self) -> PathBuf {
		self.root_dir.join(&self.www_dir)
	}

	pub fn resolved_build_dir(&self) -> PathBuf {
		self.resolved_www_dir().join(&self.build_dir)
	}

	/// `<build>/<namespace>.registry.json`, namespace lowercased.
	pub fn registry_json_path(&self) -> PathBuf {
		self.resolved_build_dir()
			.join(format!("{}.registry.json", self.namespace.to_ascii_lowercase()))
	}

	/// `<build>/<namespace>.global.js`, namespace lowercased.
	pub fn app_global_path(&self) -> PathBuf {
		self.resolved_build_dir()
			.join(format!("{}.global.js", self.namespace.to_ascii_lowercase()))
	}
}

/// Checks the settings the renderer depends on.
pub fn validate_build_config(config: &BuildConfig) -> Result<(), ConfigError> {
	let namespace = config.namespace.as_str();
	if namespace.is_empty() {
		return Err(ConfigError::MissingRequired("namespace"));
	}
	if !namespace.starts_with(|c: char| c.is_ascii_alphabetic()) {
		return Err(ConfigError::InvalidValue {
			key: "namespace",
			message: format!("'{namespace}' must start with a letter"),
		});
	}
	if let Some(c) = namespace
		.chars()
		.find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
	{
		return Err(ConfigError::InvalidValue {
			key: "namespace",
			message: format!("'{namespace}' contains invalid character '{c}'"),
		});
	}

	if config.www_dir.as_os_str().is_empty() {
		return Err(ConfigError::MissingRequired("www_dir"));
	}
	if config.build_dir.as_os_str().is_empty() {
		return Err(ConfigError::MissingRequired("build_dir"));
	}

	Ok(())
}
