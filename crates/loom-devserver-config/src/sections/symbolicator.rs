// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Symbolication configuration section.

use serde::{Deserialize, Serialize};

/// Framework-internal files hidden from symbolicated traces by default.
pub const DEFAULT_COLLAPSE_PATTERNS: &[&str] = &[
	r"/node_modules/react-native/Libraries/",
	r"/node_modules/metro-runtime/",
	r"/node_modules/regenerator-runtime/",
];

const DEFAULT_CONTEXT_LINES: usize = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SymbolicatorConfigLayer {
	pub context_lines: Option<usize>,
	pub collapse_patterns: Option<Vec<String>>,
}

impl SymbolicatorConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.context_lines.is_some() {
			self.context_lines = other.context_lines;
		}
		if other.collapse_patterns.is_some() {
			self.collapse_patterns = other.collapse_patterns;
		}
	}

	pub fn finalize(self) -> SymbolicatorConfig {
		SymbolicatorConfig {
			context_lines: self.context_lines.unwrap_or(DEFAULT_CONTEXT_LINES),
			collapse_patterns: self.collapse_patterns.unwrap_or_else(|| {
				DEFAULT_COLLAPSE_PATTERNS
					.iter()
					.map(|p| p.to_string())
					.collect()
			}),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymbolicatorConfig {
	/// Lines of original source attached around each resolved frame; 0 disables.
	pub context_lines: usize,
	/// Regexes over original file paths; matching frames are collapsed.
	pub collapse_patterns: Vec<String>,
}

impl Default for SymbolicatorConfig {
	fn default() -> Self {
		SymbolicatorConfigLayer::default().finalize()
	}
}
