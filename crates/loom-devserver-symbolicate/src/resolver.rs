// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locates the source map belonging to a bundle.
//!
//! Bundles declare their map with a trailing `//# sourceMappingURL=` comment,
//! but the declared name often does not match what the build actually
//! emitted. The resolver tries the declared map next to the bundle first and
//! falls back to the conventional `<bundle>.map` artifact.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use loom_devserver_core::BundleKey;
use tracing::{debug, instrument};

use crate::artifacts::ArtifactStore;
use crate::error::{ArtifactError, ResolveError};
use crate::logger::{LogEntry, Logger};

const SOURCE_MAPPING_URL_MARKER: &str = "sourceMappingURL=";
const MAP_COMMENT_PREFIXES: [&str; 3] = ["//# ", "//@ ", "/*# "];

/// Outcome of trying the map a bundle declares for itself.
enum DeclaredMap {
	Loaded(Bytes),
	Unavailable { attempted: String, reason: String },
}

/// Resolves bundle keys to source map bytes.
#[derive(Clone)]
pub struct SourceMapResolver {
	store: Arc<dyn ArtifactStore>,
	logger: Arc<dyn Logger>,
}

impl SourceMapResolver {
	pub fn new(store: Arc<dyn ArtifactStore>, logger: Arc<dyn Logger>) -> Self {
		Self { store, logger }
	}

	/// Produce the source map bytes for `bundle`.
	///
	/// Logs one warning when the declared map cannot be used and the
	/// `<bundle>.map` fallback is attempted.
	#[instrument(skip(self, bundle), fields(bundle = %bundle))]
	pub async fn resolve(&self, bundle: &BundleKey) -> Result<Bytes, ResolveError> {
		let content = match self.store.read_file(bundle.as_str()).await {
			Ok(content) => content,
			Err(ArtifactError::NotFound(_)) => {
				return Err(ResolveError::ArtifactNotFound(bundle.clone()));
			}
			Err(e) => return Err(ResolveError::Store(e)),
		};

		let fallback = bundle.map_path();
		if let Some(declared) = find_source_mapping_url(&content) {
			match self.load_declared(bundle, declared).await {
				DeclaredMap::Loaded(map) => return Ok(map),
				DeclaredMap::Unavailable { attempted, reason } if attempted == fallback => {
					debug!(path = %fallback, error = %reason, "declared source map is the default map and unavailable");
					return Err(ResolveError::SourceMapNotFound(bundle.clone()));
				}
				DeclaredMap::Unavailable { attempted, reason } => {
					self.logger.log(
						LogEntry::warn(
							module_path!(),
							"declared source map unavailable, falling back to default map path",
						)
						.field("bundle", bundle)
						.field("declared", declared)
						.field("attempted", &attempted)
						.field("fallback", &fallback)
						.field("error", &reason),
					);
				}
			}
		}

		match self.store.read_file(&fallback).await {
			Ok(map) => Ok(map),
			Err(e) => {
				debug!(path = %fallback, error = %e, "default source map unavailable");
				Err(ResolveError::SourceMapNotFound(bundle.clone()))
			}
		}
	}

	async fn load_declared(&self, bundle: &BundleKey, declared: &str) -> DeclaredMap {
		if declared.starts_with("data:") {
			return match decode_inline_map(declared) {
				Ok(map) => DeclaredMap::Loaded(map),
				Err(reason) => DeclaredMap::Unavailable {
					attempted: "inline data URL".to_string(),
					reason,
				},
			};
		}

		let Some(file_name) = declared_file_name(declared) else {
			return DeclaredMap::Unavailable {
				attempted: declared.to_string(),
				reason: "declared value does not name a file".to_string(),
			};
		};

		let attempted = bundle.sibling(file_name);
		match self.store.read_file(&attempted).await {
			Ok(map) => DeclaredMap::Loaded(map),
			Err(e) => DeclaredMap::Unavailable {
				attempted,
				reason: e.to_string(),
			},
		}
	}
}

/// Find the map reference in the trailing comment block of a bundle.
///
/// Only `//# `, `//@ ` and `/*# ` comments that open a line count, and only
/// while scanning back over comment or blank lines from the end. Query
/// strings and fragments are stripped from non-inline values.
pub fn find_source_mapping_url(content: &[u8]) -> Option<&str> {
	for line in content.rsplit(|&b| b == b'\n') {
		let line = std::str::from_utf8(line).ok()?.trim();
		if line.is_empty() {
			continue;
		}

		let Some(comment) = MAP_COMMENT_PREFIXES
			.iter()
			.find_map(|prefix| line.strip_prefix(*prefix))
		else {
			if line.starts_with("//") || line.starts_with("/*") {
				continue;
			}
			return None;
		};

		if let Some(value) = comment.strip_prefix(SOURCE_MAPPING_URL_MARKER) {
			return declared_value(value);
		}
	}

	None
}

fn declared_value(raw: &str) -> Option<&str> {
	let value = raw.split_whitespace().next()?;
	let value = value.strip_suffix("*/").unwrap_or(value);

	let value = if value.starts_with("data:") {
		value
	} else {
		value
			.split(['?', '#'])
			.next()
			.unwrap_or_default()
	};

	(!value.is_empty()).then_some(value)
}

/// Last path segment of a declared map reference, if it names a file.
fn declared_file_name(declared: &str) -> Option<&str> {
	let name = declared.rsplit(['/', '\\']).next()?;
	match name {
		"" | "." | ".." => None,
		name => Some(name),
	}
}

/// Decode a `data:application/json;base64,...` source map.
fn decode_inline_map(declared: &str) -> Result<Bytes, String> {
	let (header, payload) = declared
		.strip_prefix("data:")
		.and_then(|rest| rest.split_once(','))
		.ok_or_else(|| "malformed data URL".to_string())?;

	let is_base64 = header
		.rsplit(';')
		.next()
		.is_some_and(|param| param.eq_ignore_ascii_case("base64"));
	if !is_base64 {
		return Err(format!("unsupported data URL encoding: {header}"));
	}

	STANDARD
		.decode(payload)
		.map(Bytes::from)
		.map_err(|e| format!("invalid base64 payload: {e}"))
}
