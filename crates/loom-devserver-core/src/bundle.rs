// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bundle keys: normalized artifact-store paths derived from bundle URLs.

use std::fmt;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CoreError, Result};

/// Base used to resolve bundle URLs given as bare paths.
const RELATIVE_BASE: &str = "http://bundle.invalid/";

/// Normalized, slash-separated artifact-store path of a bundle.
///
/// Never starts with `/`, never contains empty, `.` or `..` segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundleKey(String);

impl BundleKey {
	/// Derive the key for a bundle URL.
	///
	/// Only the URL path contributes: scheme, host, query and fragment are
	/// dropped, segments are percent-decoded and dot segments resolved. Inputs
	/// that are not absolute URLs are treated as paths.
	pub fn from_url(bundle_url: &str) -> Result<Self> {
		let url = match Url::parse(bundle_url) {
			Ok(url) => url,
			Err(_) => Url::parse(RELATIVE_BASE)
				.and_then(|base| base.join(bundle_url))
				.map_err(|e| CoreError::InvalidBundleUrl(format!("{bundle_url}: {e}")))?,
		};

		let segments = url
			.path_segments()
			.ok_or_else(|| CoreError::InvalidBundleUrl(bundle_url.to_string()))?;

		let mut parts = Vec::new();
		for segment in segments {
			let decoded = percent_decode_str(segment)
				.decode_utf8()
				.map_err(|_| CoreError::InvalidBundleUrl(bundle_url.to_string()))?;
			match decoded.as_ref() {
				"" | "." => {}
				".." => {
					parts.pop();
				}
				s if s.contains('/') || s.contains('\\') => {
					return Err(CoreError::InvalidBundleUrl(bundle_url.to_string()));
				}
				s => parts.push(s.to_string()),
			}
		}

		if parts.is_empty() {
			return Err(CoreError::InvalidBundleUrl(bundle_url.to_string()));
		}

		Ok(Self(parts.join("/")))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Directory portion of the key, if the bundle is nested.
	pub fn parent(&self) -> Option<&str> {
		self.0.rsplit_once('/').map(|(dir, _)| dir)
	}

	/// Path of a file living next to the bundle.
	pub fn sibling(&self, file_name: &str) -> String {
		match self.parent() {
			Some(dir) => format!("{dir}/{file_name}"),
			None => file_name.to_string(),
		}
	}

	/// The conventional `<bundle>.map` path.
	pub fn map_path(&self) -> String {
		format!("{}.map", self.0)
	}
}

impl fmt::Display for BundleKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for BundleKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_from_http_url() {
		let key = BundleKey::from_url("http://host/ios/main.bundle").unwrap();
		assert_eq!(key.as_str(), "ios/main.bundle");
	}

	#[test]
	fn test_query_and_fragment_dropped() {
		let key =
			BundleKey::from_url("http://localhost:8081/index.bundle?platform=ios&dev=true#x").unwrap();
		assert_eq!(key.as_str(), "index.bundle");
	}

	#[test]
	fn test_bare_path() {
		assert_eq!(
			BundleKey::from_url("/ios/main.bundle").unwrap().as_str(),
			"ios/main.bundle"
		);
		assert_eq!(
			BundleKey::from_url("ios/./main.bundle?platform=ios").unwrap().as_str(),
			"ios/main.bundle"
		);
	}

	#[test]
	fn test_dot_segments_cannot_escape_root() {
		let key = BundleKey::from_url("http://host/../../etc/passwd").unwrap();
		assert_eq!(key.as_str(), "etc/passwd");

		let key = BundleKey::from_url("http://host/a/b/../main.bundle").unwrap();
		assert_eq!(key.as_str(), "a/main.bundle");
	}

	#[test]
	fn test_percent_decoding() {
		let key = BundleKey::from_url("http://host/my%20app/main.bundle").unwrap();
		assert_eq!(key.as_str(), "my app/main.bundle");
	}

	#[test]
	fn test_encoded_separator_rejected() {
		assert!(BundleKey::from_url("http://host/a%2Fb.bundle").is_err());
	}

	#[test]
	fn test_empty_paths_rejected() {
		assert!(BundleKey::from_url("").is_err());
		assert!(BundleKey::from_url("http://host/").is_err());
		assert!(BundleKey::from_url("data:text/plain,hello").is_err());
	}

	#[test]
	fn test_parent_and_sibling() {
		let nested = BundleKey::from_url("http://host/ios/main.bundle").unwrap();
		assert_eq!(nested.parent(), Some("ios"));
		assert_eq!(nested.sibling("main.map"), "ios/main.map");
		assert_eq!(nested.map_path(), "ios/main.bundle.map");

		let flat = BundleKey::from_url("http://host/index.bundle").unwrap();
		assert_eq!(flat.parent(), None);
		assert_eq!(flat.sibling("index.map"), "index.map");
	}

	proptest! {
		#[test]
		fn key_is_pure(path in "[a-z]{1,8}(/[a-z]{1,8}){0,4}\\.bundle", query in "[a-z=&]{0,12}") {
			let url = format!("http://localhost:8081/{path}?{query}");
			let first = BundleKey::from_url(&url).unwrap();
			let second = BundleKey::from_url(&url).unwrap();
			prop_assert_eq!(&first, &second);
			prop_assert_eq!(first.as_str(), path.as_str());
		}

		#[test]
		fn key_is_idempotent(path in "[a-z]{1,8}(/[a-z.]{1,8}){0,4}") {
			if let Ok(key) = BundleKey::from_url(&path) {
				let again = BundleKey::from_url(key.as_str()).unwrap();
				prop_assert_eq!(key, again);
			}
		}
	}
}
