// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rules for hiding framework-internal frames from human-facing traces.

use regex::Regex;

/// Original files matching any of these are collapsed after symbolication.
#[derive(Debug, Clone, Default)]
pub struct CollapseRules {
	patterns: Vec<Regex>,
}

impl CollapseRules {
	/// Compile the given patterns.
	pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let patterns = patterns
			.into_iter()
			.map(|p| Regex::new(p.as_ref()))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self { patterns })
	}

	/// Rules that never collapse anything.
	pub fn none() -> Self {
		Self::default()
	}

	pub fn matches(&self, original_file: &str) -> bool {
		self.patterns.iter().any(|p| p.is_match(original_file))
	}

	pub fn len(&self) -> usize {
		self.patterns.len()
	}

	pub fn is_empty(&self) -> bool {
		self.patterns.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_matches_any_pattern() {
		let rules = CollapseRules::new([
			r"/node_modules/react-native/Libraries/",
			r"/node_modules/metro-runtime/",
		])
		.unwrap();

		assert!(rules.matches("/app/node_modules/metro-runtime/src/polyfills/require.js"));
		assert!(!rules.matches("/app/src/App.tsx"));
		assert_eq!(rules.len(), 2);
	}

	#[test]
	fn test_none_matches_nothing() {
		assert!(!CollapseRules::none().matches("anything"));
		assert!(CollapseRules::none().is_empty());
	}

	#[test]
	fn test_invalid_pattern() {
		assert!(CollapseRules::new(["("]).is_err());
	}
}
