//! Renderer logging.
//!
//! [`Logger`] is the handle the renderer and its engine log through. It
//! filters by its own [`LogLevel`] and forwards surviving messages as
//! `tracing` events under the `trellis` target, so the process subscriber
//! decides where they end up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target of every event emitted through [`Logger`].
pub const LOG_TARGET: &str = "trellis";

/// Logger verbosity, least to most severe.
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Debug,
	#[default]
	Info,
	Warn,
	Error,
}

impl LogLevel {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Debug => "debug",
			Self::Info => "info",
			Self::Warn => "warn",
			Self::Error => "error",
		}
	}
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for LogLevel {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"debug" => Ok(Self::Debug),
			"info" => Ok(Self::Info),
			"warn" | "warning" => Ok(Self::Warn),
			"error" => Ok(Self::Error),
			other => Err(format!("unknown log level '{other}'")),
		}
	}
}

/// Level-filtered logger handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Logger {
	level: LogLevel,
}

impl Logger {
	pub fn new(level: LogLevel) -> Self {
		Self { level }
	}

	pub fn level(&self) -> LogLevel {
		self.level
	}

	/// Returns `true` if messages at `level` pass this logger's filter.
	pub fn enabled(&self, level: LogLevel) -> bool {
		level >= self.level
	}

	pub fn debug(&self, message: impl fmt::Display) {
		if self.enabled(LogLevel::Debug) {
			tracing::debug!(target: LOG_TARGET, "{}", message);
		}
	}

	pub fn info(&self, message: impl fmt::Display) {
		if self.enabled(LogLevel::Info) {
			tracing::info!(target: LOG_TARGET, "{}", message);
		}
	}

	pub fn warn(&self, message: impl fmt::Display) {
		if self.enabled(LogLevel::Warn) {
			tracing::warn!(target: LOG_TARGET, "{}", message);
		}
	}

	pub fn error(&self, message: impl fmt::Display) {
		if self.enabled(LogLevel::Error) {
			tracing::error!(target: LOG_TARGET, "{}", message);
		}
	}
}

/// Installs a global fmt subscriber filtered at `level`.
///
/// `RUST_LOG` takes precedence when set. Does nothing if a global subscriber
/// is already installed.
pub fn init_subscriber(level: LogLevel) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("{LOG_TARGET}={level},warn")));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(true)
		.try_init();
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(LogLevel::Debug, LogLevel::Debug, true)]
	#[case(LogLevel::Info, LogLevel::Debug, false)]
	#[case(LogLevel::Info, LogLevel::Error, true)]
	#[case(LogLevel::Error, LogLevel::Warn, false)]
	fn test_enabled(#[case] logger_level: LogLevel, #[case] message: LogLevel, #[case] on: bool) {
		assert_eq!(Logger::new(logger_level).enabled(message), on);
	}

	#[rstest]
	#[case("debug", LogLevel::Debug)]
	#[case("INFO", LogLevel::Info)]
	#[case("warning", LogLevel::Warn)]
	#[case("error", LogLevel::Error)]
	fn test_parse_level(#[case] input: &str, #[case] expected: LogLevel) {
		assert_eq!(input.parse::<LogLevel>().unwrap(), expected);
	}

	#[rstest]
	fn test_parse_unknown_level() {
		assert!("verbose".parse::<LogLevel>().is_err());
	}

	#[rstest]
	fn test_init_subscriber_twice_is_harmless() {
		init_subscriber(LogLevel::Debug);
		init_subscriber(LogLevel::Error);
	}
}
