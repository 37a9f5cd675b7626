// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration as produced by a single source.

use serde::{Deserialize, Serialize};

use crate::sections::{
	ArtifactsConfigLayer, HttpConfigLayer, LoggingConfigLayer, SymbolicatorConfigLayer,
};

/// One source's view of the configuration; unset fields defer to lower layers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfigLayer {
	pub http: Option<HttpConfigLayer>,
	pub artifacts: Option<ArtifactsConfigLayer>,
	pub symbolicator: Option<SymbolicatorConfigLayer>,
	pub logging: Option<LoggingConfigLayer>,
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T)) {
	match (base.as_mut(), other) {
		(Some(existing), Some(overlay)) => merge(existing, overlay),
		(None, Some(overlay)) => *base = Some(overlay),
		(_, None) => {}
	}
}

impl ServerConfigLayer {
	/// Overlay `other` on top of `self`.
	pub fn merge(&mut self, other: Self) {
		merge_section(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_section(&mut self.artifacts, other.artifacts, ArtifactsConfigLayer::merge);
		merge_section(
			&mut self.symbolicator,
			other.symbolicator,
			SymbolicatorConfigLayer::merge,
		);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_keeps_unset_sections() {
		let mut base = ServerConfigLayer {
			http: Some(HttpConfigLayer {
				host: Some("0.0.0.0".to_string()),
				port: Some(8081),
			}),
			..Default::default()
		};
		base.merge(ServerConfigLayer {
			http: Some(HttpConfigLayer {
				host: None,
				port: Some(9000),
			}),
			logging: Some(LoggingConfigLayer {
				level: Some("debug".to_string()),
				format: None,
			}),
			..Default::default()
		});

		let http = base.http.unwrap();
		assert_eq!(http.host.as_deref(), Some("0.0.0.0"));
		assert_eq!(http.port, Some(9000));
		assert_eq!(base.logging.unwrap().level.as_deref(), Some("debug"));
		assert!(base.artifacts.is_none());
	}
}
