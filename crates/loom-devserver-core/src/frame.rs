// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack frame types exchanged with clients.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A single frame of a runtime stack trace as reported by the client.
///
/// Lines are 1-indexed, columns are 0-indexed, matching what JavaScript
/// engines report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
	/// URL of the bundle the frame executed in.
	#[serde(rename = "file")]
	pub bundle_url: String,
	#[serde(rename = "lineNumber")]
	pub line: u32,
	pub column: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub method_name: Option<String>,
}

impl StackFrame {
	pub fn new(bundle_url: impl Into<String>, line: u32, column: u32) -> Self {
		Self {
			bundle_url: bundle_url.into(),
			line,
			column,
			method_name: None,
		}
	}

	pub fn with_method_name(mut self, method_name: impl Into<String>) -> Self {
		self.method_name = Some(method_name.into());
		self
	}

	/// Check the invariants serde cannot express.
	pub fn validate(&self) -> Result<()> {
		if self.line == 0 {
			return Err(CoreError::InvalidFrame(format!(
				"line numbers start at 1 (frame in {})",
				self.bundle_url
			)));
		}
		Ok(())
	}
}

/// Source lines surrounding a resolved position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeContext {
	pub pre_context: Vec<String>,
	pub context_line: String,
	pub post_context: Vec<String>,
}

/// A stack frame mapped back to its original source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFrame {
	pub original_file: String,
	/// 1-indexed.
	pub original_line: u32,
	/// 0-indexed.
	pub original_column: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub method_name: Option<String>,
	/// Set when no mapping was found or the frame should be hidden from
	/// a human-facing trace.
	pub collapsed: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub context: Option<CodeContext>,
}

impl ResolvedFrame {
	/// A collapsed frame carrying the input position unchanged.
	pub fn unmapped(frame: &StackFrame) -> Self {
		Self {
			original_file: frame.bundle_url.clone(),
			original_line: frame.line,
			original_column: frame.column,
			method_name: frame.method_name.clone(),
			collapsed: true,
			context: None,
		}
	}
}
