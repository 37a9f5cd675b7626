// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logging configuration section.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output format of the stdout log layer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
}

impl fmt::Display for LogFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Pretty => write!(f, "pretty"),
			Self::Json => write!(f, "json"),
		}
	}
}

impl FromStr for LogFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"pretty" | "text" => Ok(Self::Pretty),
			"json" => Ok(Self::Json),
			other => Err(format!("unknown log format '{other}'")),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfigLayer {
	pub level: Option<String>,
	pub format: Option<LogFormat>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.format.is_some() {
			self.format = other.format;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self.level.unwrap_or_else(|| "info".to_string()),
			format: self.format.unwrap_or_default(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
	/// Default `EnvFilter` directive when `RUST_LOG` is unset.
	pub level: String,
	pub format: LogFormat,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		LoggingConfigLayer::default().finalize()
	}
}
