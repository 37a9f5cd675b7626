// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP listener configuration section.

use serde::{Deserialize, Serialize};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8081;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HttpConfigLayer {
	pub host: Option<String>,
	pub port: Option<u16>,
}

impl HttpConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.host.is_some() {
			self.host = other.host;
		}
		if other.port.is_some() {
			self.port = other.port;
		}
	}

	pub fn finalize(self) -> HttpConfig {
		HttpConfig {
			host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
			port: self.port.unwrap_or(DEFAULT_PORT),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
}

impl Default for HttpConfig {
	fn default() -> Self {
		HttpConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = HttpConfig::default();
		assert_eq!(config.host, "127.0.0.1");
		assert_eq!(config.port, 8081);
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = HttpConfigLayer {
			host: Some("localhost".to_string()),
			port: Some(8081),
		};
		base.merge(HttpConfigLayer {
			host: None,
			port: Some(19000),
		});
		assert_eq!(base.host.as_deref(), Some("localhost"));
		assert_eq!(base.port, Some(19000));
	}
}
