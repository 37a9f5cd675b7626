// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Leveled, structured log sink handed to the symbolication components.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// Default buffer capacity.
pub const DEFAULT_CAPACITY: usize = 1_000;

/// Log severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Trace,
	Debug,
	Info,
	Warn,
	Error,
}

/// A single structured log entry.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
	pub timestamp: DateTime<Utc>,
	pub level: LogLevel,
	pub target: String,
	pub message: String,
	pub fields: Vec<(String, String)>,
}

impl LogEntry {
	pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			timestamp: Utc::now(),
			level,
			target: target.into(),
			message: message.into(),
			fields: Vec::new(),
		}
	}

	pub fn warn(target: impl Into<String>, message: impl Into<String>) -> Self {
		Self::new(LogLevel::Warn, target, message)
	}

	pub fn error(target: impl Into<String>, message: impl Into<String>) -> Self {
		Self::new(LogLevel::Error, target, message)
	}

	/// Attach a structured field.
	pub fn field(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
		self.fields.push((name.into(), value.to_string()));
		self
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.fields
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}
}

/// Sink for log entries.
pub trait Logger: Send + Sync {
	fn log(&self, entry: LogEntry);
}

/// Forwards entries to the process-wide `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
	fn log(&self, entry: LogEntry) {
		let fields = FieldList(&entry.fields);
		let target = entry.target.as_str();
		let message = entry.message.as_str();
		match entry.level {
			LogLevel::Trace => tracing::trace!(origin = target, %fields, "{message}"),
			LogLevel::Debug => tracing::debug!(origin = target, %fields, "{message}"),
			LogLevel::Info => tracing::info!(origin = target, %fields, "{message}"),
			LogLevel::Warn => tracing::warn!(origin = target, %fields, "{message}"),
			LogLevel::Error => tracing::error!(origin = target, %fields, "{message}"),
		}
	}
}

struct FieldList<'a>(&'a [(String, String)]);

impl fmt::Display for FieldList<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, (key, value)) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(" ")?;
			}
			write!(f, "{key}={value}")?;
		}
		Ok(())
	}
}

/// A thread-safe ring buffer that stores recent log entries.
///
/// When the buffer is full, oldest entries are evicted to make room for new ones.
#[derive(Clone)]
pub struct LogBuffer {
	inner: Arc<LogBufferInner>,
}

struct LogBufferInner {
	entries: RwLock<VecDeque<LogEntry>>,
	capacity: usize,
}

impl LogBuffer {
	/// Create a new log buffer with the specified capacity.
	pub fn new(capacity: usize) -> Self {
		Self {
			inner: Arc::new(LogBufferInner {
				entries: RwLock::new(VecDeque::with_capacity(capacity)),
				capacity,
			}),
		}
	}

	/// Create a new log buffer with default capacity.
	pub fn with_default_capacity() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}

	/// Snapshot of all buffered entries, oldest first.
	pub fn entries(&self) -> Vec<LogEntry> {
		self.inner.entries.read().iter().cloned().collect()
	}

	/// Snapshot of the entries logged at exactly `level`.
	pub fn entries_at(&self, level: LogLevel) -> Vec<LogEntry> {
		self.inner
			.entries
			.read()
			.iter()
			.filter(|e| e.level == level)
			.cloned()
			.collect()
	}

	pub fn len(&self) -> usize {
		self.inner.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.entries.read().is_empty()
	}
}

impl Default for LogBuffer {
	fn default() -> Self {
		Self::with_default_capacity()
	}
}

impl Logger for LogBuffer {
	fn log(&self, entry: LogEntry) {
		if self.inner.capacity == 0 {
			return;
		}
		let mut entries = self.inner.entries.write();
		if entries.len() >= self.inner.capacity {
			entries.pop_front();
		}
		entries.push_back(entry);
	}
}
