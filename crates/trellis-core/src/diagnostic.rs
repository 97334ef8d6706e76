//! Diagnostics.
//!
//! A [`Diagnostic`] describes one problem found anywhere in the pipeline.
//! Diagnostics accumulate on a result; they are never raised past the
//! renderer boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticType {
	Build,
	Registry,
	Hydrate,
	Runtime,
}

impl fmt::Display for DiagnosticType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Build => write!(f, "build"),
			Self::Registry => write!(f, "registry"),
			Self::Hydrate => write!(f, "hydrate"),
			Self::Runtime => write!(f, "runtime"),
		}
	}
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
	Error,
	Warn,
	Info,
	Log,
	Debug,
}

impl fmt::Display for DiagnosticLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Error => write!(f, "error"),
			Self::Warn => write!(f, "warn"),
			Self::Info => write!(f, "info"),
			Self::Log => write!(f, "log"),
			Self::Debug => write!(f, "debug"),
		}
	}
}

/// A structured problem report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
	#[serde(rename = "type")]
	pub kind: DiagnosticType,
	pub level: DiagnosticLevel,
	pub header: String,
	pub message_text: String,
}

impl Diagnostic {
	/// Creates a diagnostic.
	pub fn new(
		kind: DiagnosticType,
		level: DiagnosticLevel,
		header: impl Into<String>,
		message_text: impl Into<String>,
	) -> Self {
		Self {
			kind,
			level,
			header: header.into(),
			message_text: message_text.into(),
		}
	}

	/// Creates an error-level diagnostic.
	pub fn error(
		kind: DiagnosticType,
		header: impl Into<String>,
		message_text: impl Into<String>,
	) -> Self {
		Self::new(kind, DiagnosticLevel::Error, header, message_text)
	}

	pub fn is_error(&self) -> bool {
		self.level == DiagnosticLevel::Error
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"[{} {}] {}: {}",
			self.kind, self.level, self.header, self.message_text
		)
	}
}

/// Returns `true` if any diagnostic in `diagnostics` is an error.
pub fn has_error(diagnostics: &[Diagnostic]) -> bool {
	diagnostics.iter().any(Diagnostic::is_error)
}
