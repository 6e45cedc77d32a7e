// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Injected logging.
//!
//! Every component receives a [`Logger`] at construction instead of reaching
//! for process-wide state. The default sink forwards to `tracing` under the
//! `appflags` target, so applications that already install a subscriber see
//! SDK diagnostics alongside their own.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Severity of a log line, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
	Debug,
	Info,
	#[default]
	Warn,
	Error,
}

impl LogLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			LogLevel::Debug => "debug",
			LogLevel::Info => "info",
			LogLevel::Warn => "warn",
			LogLevel::Error => "error",
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
		match s.trim().to_ascii_lowercase().as_str() {
			"debug" => Ok(LogLevel::Debug),
			"info" => Ok(LogLevel::Info),
			"warn" | "warning" => Ok(LogLevel::Warn),
			"error" => Ok(LogLevel::Error),
			other => Err(format!("unknown log level: {other}")),
		}
	}
}

/// Destination for SDK log lines.
pub trait LogSink: Send + Sync {
	fn log(&self, level: LogLevel, message: &str);
}

/// Forwards log lines to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
	fn log(&self, level: LogLevel, message: &str) {
		match level {
			LogLevel::Debug => tracing::debug!(target: "appflags", "{message}"),
			LogLevel::Info => tracing::info!(target: "appflags", "{message}"),
			LogLevel::Warn => tracing::warn!(target: "appflags", "{message}"),
			LogLevel::Error => tracing::error!(target: "appflags", "{message}"),
		}
	}
}

/// Level-filtered handle to a [`LogSink`].
#[derive(Clone)]
pub struct Logger {
	sink: Arc<dyn LogSink>,
	min_level: LogLevel,
}

impl Logger {
	pub fn new(sink: Arc<dyn LogSink>, min_level: LogLevel) -> Self {
		Self { sink, min_level }
	}

	/// A logger writing to `tracing` at the given minimum level.
	pub fn tracing(min_level: LogLevel) -> Self {
		Self::new(Arc::new(TracingSink), min_level)
	}

	pub fn min_level(&self) -> LogLevel {
		self.min_level
	}

	pub fn enabled(&self, level: LogLevel) -> bool {
		level >= self.min_level
	}

	pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
		if self.enabled(level) {
			self.sink.log(level, &message.to_string());
		}
	}

	pub fn debug(&self, message: impl fmt::Display) {
		self.log(LogLevel::Debug, message);
	}

	pub fn info(&self, message: impl fmt::Display) {
		self.log(LogLevel::Info, message);
	}

	pub fn warn(&self, message: impl fmt::Display) {
		self.log(LogLevel::Warn, message);
	}

	pub fn error(&self, message: impl fmt::Display) {
		self.log(LogLevel::Error, message);
	}
}

impl Default for Logger {
	fn default() -> Self {
		Self::tracing(LogLevel::default())
	}
}

impl fmt::Debug for Logger {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Logger")
			.field("min_level", &self.min_level)
			.finish_non_exhaustive()
	}
}


#[cfg(test)]
mod tests {
	use super::testing::RecordingSink;
	use super::*;

	#[test]
	fn messages_below_min_level_are_dropped() {
		let sink = Arc::new(RecordingSink::default());
		let logger = Logger::new(sink.clone(), LogLevel::Warn);

		logger.debug("hidden");
		logger.info("hidden");
		logger.warn("shown");
		logger.error("shown");

		assert_eq!(sink.lines().len(), 2);
		assert_eq!(sink.count(LogLevel::Warn), 1);
		assert_eq!(sink.count(LogLevel::Error), 1);
	}

	#[test]
	fn default_level_is_warn() {
		assert_eq!(LogLevel::default(), LogLevel::Warn);
		assert_eq!(Logger::default().min_level(), LogLevel::Warn);
	}

	#[test]
	fn parse_log_level() {
		assert_eq!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug));
		assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
		assert_eq!(" error ".parse::<LogLevel>(), Ok(LogLevel::Error));
		assert!("verbose".parse::<LogLevel>().is_err());
	}

	#[test]
	fn levels_are_ordered() {
		assert!(LogLevel::Debug < LogLevel::Info);
		assert!(LogLevel::Info < LogLevel::Warn);
		assert!(LogLevel::Warn < LogLevel::Error);
	}
}
