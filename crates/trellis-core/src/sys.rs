//! Host capabilities.
//!
//! The renderer never touches the file system or parses URLs directly; it goes
//! through the capabilities bundled in [`Sys`]. The defaults are the OS file
//! system and WHATWG URL parsing, and tests swap in [`MemoryFileSystem`] or a
//! custom [`UrlSys`].

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// File system errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
	#[error("file not found: {}", .0.display())]
	NotFound(PathBuf),

	#[error("failed to read {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Read access to files.
pub trait FileSystem: Send + Sync {
	/// Reads the whole file at `path` as UTF-8 text.
	fn read_to_string(&self, path: &Path) -> Result<String, FsError>;
}

/// The operating system's file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
	fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
		std::fs::read_to_string(path).map_err(|source| {
			if source.kind() == std::io::ErrorKind::NotFound {
				FsError::NotFound(path.to_path_buf())
			} else {
				FsError::Io {
					path: path.to_path_buf(),
					source,
				}
			}
		})
	}
}

/// A file system held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
	files: Arc<RwLock<HashMap<PathBuf, String>>>,
}

impl MemoryFileSystem {
	pub fn new() -> Self {
		Self::default()
	}

	/// Writes `contents` to `path`, replacing any previous file.
	pub fn write(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
		self.files.write().insert(path.into(), contents.into());
	}

	/// Removes the file at `path`.
	pub fn remove(&self, path: &Path) -> bool {
		self.files.write().remove(path).is_some()
	}

	pub fn exists(&self, path: &Path) -> bool {
		self.files.read().contains_key(path)
	}
}

impl FileSystem for MemoryFileSystem {
	fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
		self.files
			.read()
			.get(path)
			.cloned()
			.ok_or_else(|| FsError::NotFound(path.to_path_buf()))
	}
}

/// URL parse failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid url '{input}': {reason}")]
pub struct UrlError {
	pub input: String,
	pub reason: String,
}

impl UrlError {
	pub fn new(input: impl Into<String>, reason: impl fmt::Display) -> Self {
		Self {
			input: input.into(),
			reason: reason.to_string(),
		}
	}
}

/// A URL split into the components the renderer edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
	/// Scheme including the trailing colon, e.g. `https:`.
	pub protocol: Option<String>,
	/// Percent-encoded user name; empty when the URL carries none.
	pub username: String,
	pub password: Option<String>,
	pub hostname: Option<String>,
	pub port: Option<u16>,
	/// Path, always starting with `/` for hierarchical URLs.
	pub pathname: String,
	/// Query without the leading `?`.
	pub query: Option<String>,
	/// Fragment without the leading `#`.
	pub fragment: Option<String>,
}

impl UrlParts {
	fn from_url(url: &Url) -> Self {
		Self {
			protocol: Some(format!("{}:", url.scheme())),
			username: url.username().to_string(),
			password: url.password().map(str::to_string),
			hostname: url.host_str().map(str::to_string),
			port: url.port(),
			pathname: url.path().to_string(),
			query: url.query().map(str::to_string),
			fragment: url.fragment().map(str::to_string),
		}
	}
}

/// URL parse/format capability.
pub trait UrlSys: Send + Sync {
	/// Splits `input` into components. Relative input leaves protocol and
	/// hostname empty.
	fn parse(&self, input: &str) -> Result<UrlParts, UrlError>;

	/// Joins components back into a URL string.
	fn format(&self, parts: &UrlParts) -> String;
}

/// Base used to resolve relative input; its scheme and host are discarded.
const RELATIVE_BASE: &str = "http://relative.invalid/";

/// WHATWG URL parsing backed by the `url` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatwgUrlSys;

impl UrlSys for WhatwgUrlSys {
	fn parse(&self, input: &str) -> Result<UrlParts, UrlError> {
		match Url::parse(input) {
			Ok(url) => Ok(UrlParts::from_url(&url)),
			Err(url::ParseError::RelativeUrlWithoutBase) => {
				let base = Url::parse(RELATIVE_BASE).map_err(|e| UrlError::new(input, e))?;
				let joined = base.join(input).map_err(|e| UrlError::new(input, e))?;
				let mut parts = UrlParts::from_url(&joined);
				parts.protocol = None;
				// protocol-relative input keeps its host
				if !input.starts_with("//") {
					parts.username.clear();
					parts.password = None;
					parts.hostname = None;
					parts.port = None;
				}
				Ok(parts)
			}
			Err(e) => Err(UrlError::new(input, e)),
		}
	}

	fn format(&self, parts: &UrlParts) -> String {
		let mut out = String::with_capacity(parts.pathname.len() + 32);

		if let Some(protocol) = &parts.protocol {
			out.push_str(protocol);
			if !protocol.ends_with(':') {
				out.push(':');
			}
		}

		if let Some(hostname) = &parts.hostname {
			out.push_str("//");
			if !parts.username.is_empty() || parts.password.is_some() {
				out.push_str(&parts.username);
				if let Some(password) = &parts.password {
					out.push(':');
					out.push_str(password);
				}
				out.push('@');
			}
			out.push_str(hostname);
			if let Some(port) = parts.port {
				out.push(':');
				out.push_str(&port.to_string());
			}
			if !parts.pathname.starts_with('/') {
				out.push('/');
			}
		}

		out.push_str(&parts.pathname);

		if let Some(query) = &parts.query {
			out.push('?');
			out.push_str(query);
		}
		if let Some(fragment) = &parts.fragment {
			out.push('#');
			out.push_str(fragment);
		}

		out
	}
}

/// The capabilities handed to the renderer.
#[derive(Clone)]
pub struct Sys {
	pub fs: Arc<dyn FileSystem>,
	pub url: Arc<dyn UrlSys>,
}

impl Sys {
	pub fn new(fs: Arc<dyn FileSystem>, url: Arc<dyn UrlSys>) -> Self {
		Self { fs, url }
	}

	/// Replaces the file system capability.
	pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
		self.fs = fs;
		self
	}

	/// Replaces the URL capability.
	pub fn with_url(mut self, url: Arc<dyn UrlSys>) -> Self {
		self.url = url;
		self
	}
}

impl Default for Sys {
	fn default() -> Self {
		Self {
			fs: Arc::new(OsFileSystem),
			url: Arc::new(WhatwgUrlSys),
		}
	}
}

impl fmt::Debug for Sys {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Sys").finish_non_exhaustive()
	}
}
