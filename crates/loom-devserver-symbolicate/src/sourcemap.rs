// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map parsing and position lookup.
//!
//! Implements the Source Map v3 specification for bundles emitted by the
//! dev server's build.

use loom_devserver_core::CodeContext;
use serde::Deserialize;

use crate::error::SourceMapError;
use crate::vlq::{decode_vlq_mappings, DecodedMappings, SourceLocation};

type Result<T> = std::result::Result<T, SourceMapError>;

/// Raw source map JSON structure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSourceMap {
	version: u32,
	#[serde(default)]
	file: Option<String>,
	#[serde(default)]
	source_root: Option<String>,
	sources: Vec<Option<String>>,
	#[serde(default)]
	sources_content: Option<Vec<Option<String>>>,
	#[serde(default)]
	names: Vec<String>,
	mappings: String,
}

/// A decoded source map document.
#[derive(Debug, Clone)]
pub struct ParsedSourceMap {
	pub file: Option<String>,
	pub source_root: Option<String>,
	/// `null` entries are kept so indices stay aligned with `sources_content`.
	pub sources: Vec<Option<String>>,
	pub sources_content: Vec<Option<String>>,
	pub names: Vec<String>,
	mappings: DecodedMappings,
}

/// Where a generated position came from, borrowing from the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalPosition<'a> {
	/// Source path with `sourceRoot` applied.
	pub source: String,
	/// 1-indexed.
	pub line: u32,
	/// 0-indexed.
	pub column: u32,
	pub name: Option<&'a str>,
	pub source_content: Option<&'a str>,
}

/// Result of looking up a generated position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
	/// The position is covered by a mapped segment.
	Exact(OriginalPosition<'a>),
	/// The position is not covered; this is the nearest preceding mapped segment.
	Nearest(OriginalPosition<'a>),
	/// Nothing at or before the position carries a source.
	Unmapped,
}

impl ParsedSourceMap {
	/// Parse a source map from JSON bytes.
	pub fn from_bytes(data: &[u8]) -> Result<Self> {
		let raw: RawSourceMap = serde_json::from_slice(data)?;

		if raw.version != 3 {
			return Err(SourceMapError::InvalidVersion(raw.version));
		}

		let mappings = decode_vlq_mappings(&raw.mappings)?;

		Ok(Self {
			file: raw.file,
			source_root: raw.source_root,
			sources: raw.sources,
			sources_content: raw.sources_content.unwrap_or_default(),
			names: raw.names,
			mappings,
		})
	}

	/// Lookup the original position for a generated line and column.
	///
	/// Lines are 1-indexed (as displayed in stack traces), columns are 0-indexed.
	pub fn lookup(&self, line: u32, column: u32) -> Result<Lookup<'_>> {
		let line_0indexed = line.saturating_sub(1);

		if let Some(location) = self
			.mappings
			.find(line_0indexed, column)
			.and_then(|m| m.source.as_ref())
		{
			return Ok(Lookup::Exact(self.original_position(location)?));
		}

		match self
			.mappings
			.find_preceding_mapped(line_0indexed, column)
			.and_then(|m| m.source.as_ref())
		{
			Some(location) => Ok(Lookup::Nearest(self.original_position(location)?)),
			None => Ok(Lookup::Unmapped),
		}
	}

	fn original_position(&self, location: &SourceLocation) -> Result<OriginalPosition<'_>> {
		let index = location.source_index as usize;
		let source = self
			.sources
			.get(index)
			.ok_or(SourceMapError::InvalidSourceIndex(location.source_index))?
			.as_deref()
			.unwrap_or_default();

		let source_content = self
			.sources_content
			.get(index)
			.and_then(|c| c.as_deref());

		let name = location
			.name_index
			.and_then(|idx| self.names.get(idx as usize))
			.map(String::as_str);

		Ok(OriginalPosition {
			source: self.resolve_source_path(source),
			line: location.original_line + 1,
			column: location.original_column,
			name,
			source_content,
		})
	}

	fn resolve_source_path(&self, source: &str) -> String {
		match self.source_root.as_deref().map(|r| r.trim_end_matches('/')) {
			Some(root) if !root.is_empty() => format!("{root}/{source}"),
			_ => source.to_string(),
		}
	}
}

/// Source lines around 1-indexed `line`, at most `radius` on each side.
///
/// Returns `None` when `line` lies outside `source_content`.
pub fn extract_context(source_content: &str, line: usize, radius: usize) -> Option<CodeContext> {
	let lines: Vec<&str> = source_content.lines().collect();
	let target = line.checked_sub(1).filter(|&idx| idx < lines.len())?;

	let owned = |range: &[&str]| range.iter().map(|l| l.to_string()).collect::<Vec<_>>();
	let after = (target + 1 + radius).min(lines.len());

	Some(CodeContext {
		pre_context: owned(&lines[target.saturating_sub(radius)..target]),
		context_line: lines[target].to_string(),
		post_context: owned(&lines[target + 1..after]),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_source_map() -> &'static str {
		r#"{
			"version": 3,
			"file": "out.js",
			"sourceRoot": "",
			"sources": ["src/index.ts"],
			"sourcesContent": ["function hello() {\n  console.log('Hello, World!');\n}\n\nhello();\n"],
			"names": ["hello", "console", "log"],
			"mappings": "AAAA,SAASA,KAAKT,CAAC;AACXC,OAAQ,CAACC,GAAG,CAAC,eAAe,CAAC,CAAC;AAClC,CAAC;AAEDF,KAAK,EAAE,CAAC"
		}"#
	}

	#[test]
	fn test_parse_source_map() {
		let sm = ParsedSourceMap::from_bytes(sample_source_map().as_bytes()).unwrap();

		assert_eq!(sm.file, Some("out.js".to_string()));
		assert_eq!(sm.sources, vec![Some("src/index.ts".to_string())]);
		assert_eq!(sm.names, vec!["hello", "console", "log"]);
		assert!(sm.sources_content[0].is_some());
	}

	#[test]
	fn test_lookup_position() {
		let sm = ParsedSourceMap::from_bytes(sample_source_map().as_bytes()).unwrap();

		match sm.lookup(1, 0).unwrap() {
			Lookup::Exact(pos) => {
				assert_eq!(pos.source, "src/index.ts");
				assert_eq!(pos.line, 1);
				assert!(pos.source_content.is_some());
			}
			other => panic!("expected exact mapping, got {other:?}"),
		}
	}

	#[test]
	fn test_lookup_name() {
		let sm = ParsedSourceMap::from_bytes(sample_source_map().as_bytes()).unwrap();

		// Second segment on line 1 starts at column 9 and names `hello`
		match sm.lookup(1, 9).unwrap() {
			Lookup::Exact(pos) => assert_eq!(pos.name, Some("hello")),
			other => panic!("expected exact mapping, got {other:?}"),
		}
	}

	#[test]
	fn test_lookup_unmapped_gap_uses_nearest() {
		// Line 1: mapped at col 0; line 2: unmapped at col 0
		let json = r#"{
			"version": 3,
			"sources": ["a.js"],
			"names": [],
			"mappings": "AACA;A"
		}"#;
		let sm = ParsedSourceMap::from_bytes(json.as_bytes()).unwrap();

		match sm.lookup(2, 5).unwrap() {
			Lookup::Nearest(pos) => {
				assert_eq!(pos.source, "a.js");
				assert_eq!(pos.line, 2);
				assert_eq!(pos.column, 0);
			}
			other => panic!("expected nearest mapping, got {other:?}"),
		}
	}

	#[test]
	fn test_lookup_before_any_mapping() {
		let json = r#"{"version": 3, "sources": ["a.js"], "names": [], "mappings": ";UAAA"}"#;
		let sm = ParsedSourceMap::from_bytes(json.as_bytes()).unwrap();

		assert_eq!(sm.lookup(1, 0).unwrap(), Lookup::Unmapped);
		assert_eq!(sm.lookup(2, 3).unwrap(), Lookup::Unmapped);
		assert!(matches!(sm.lookup(2, 10).unwrap(), Lookup::Exact(_)));
	}

	#[test]
	fn test_invalid_source_index() {
		let json = r#"{"version": 3, "sources": [], "names": [], "mappings": "AAAA"}"#;
		let sm = ParsedSourceMap::from_bytes(json.as_bytes()).unwrap();
		assert!(matches!(
			sm.lookup(1, 0),
			Err(SourceMapError::InvalidSourceIndex(0))
		));
	}

	#[test]
	fn test_extract_context() {
		let source = "line 1\nline 2\nline 3\nline 4\nline 5\nline 6\nline 7";

		let context = extract_context(source, 4, 2).unwrap();

		assert_eq!(context.pre_context, vec!["line 2", "line 3"]);
		assert_eq!(context.context_line, "line 4");
		assert_eq!(context.post_context, vec!["line 5", "line 6"]);
	}

	#[test]
	fn test_extract_context_clamps_to_file() {
		let source = "line 1\nline 2\nline 3";

		let first = extract_context(source, 1, 5).unwrap();
		assert!(first.pre_context.is_empty());
		assert_eq!(first.post_context, vec!["line 2", "line 3"]);

		let last = extract_context(source, 3, 1).unwrap();
		assert_eq!(last.pre_context, vec!["line 2"]);
		assert!(last.post_context.is_empty());

		assert!(extract_context(source, 0, 2).is_none());
		assert!(extract_context(source, 4, 2).is_none());
	}

	#[test]
	fn test_invalid_version() {
		let json = r#"{"version": 2, "sources": [], "names": [], "mappings": ""}"#;
		let result = ParsedSourceMap::from_bytes(json.as_bytes());
		assert!(matches!(result, Err(SourceMapError::InvalidVersion(2))));
	}

	#[test]
	fn test_source_root_resolution() {
		let json = r#"{
			"version": 3,
			"sourceRoot": "src/",
			"sources": ["index.ts"],
			"names": [],
			"mappings": "AAAA"
		}"#;
		let sm = ParsedSourceMap::from_bytes(json.as_bytes()).unwrap();

		match sm.lookup(1, 0).unwrap() {
			Lookup::Exact(pos) => assert_eq!(pos.source, "src/index.ts"),
			other => panic!("expected exact mapping, got {other:?}"),
		}
	}
}
