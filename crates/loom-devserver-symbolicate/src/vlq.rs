// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! VLQ (Variable-Length Quantity) decoder for source map mappings.
//!
//! Source maps use Base64 VLQ encoding for compact storage of line/column mappings.
//! This module provides decoding functionality following the source map v3 spec.

use crate::error::SourceMapError;

type Result<T> = std::result::Result<T, SourceMapError>;

/// Base64 character set used in VLQ encoding.
const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Values wider than this cannot be represented as `i32`.
const MAX_SHIFT: u32 = 30;

/// Decode a Base64 character to its 6-bit value.
fn decode_char(ch: u8) -> Result<i64> {
	BASE64_CHARS
		.iter()
		.position(|&c| c == ch)
		.map(|pos| pos as i64)
		.ok_or(SourceMapError::InvalidVlqChar(ch as char))
}

/// Decode a VLQ-encoded segment into a vector of signed integers.
///
/// Each segment represents one or more values:
/// - Minimum 1 value: generated column offset
/// - Optional 4 more values: source index, original line, original column, name index
pub fn decode_vlq_segment(segment: &str) -> Result<Vec<i32>> {
	let mut values = Vec::new();
	let mut value = 0i64;
	let mut shift = 0u32;

	for ch in segment.bytes() {
		let digit = decode_char(ch)?;

		if shift > MAX_SHIFT {
			return Err(SourceMapError::VlqOverflow);
		}

		// Continuation bit is the 6th bit (0b100000 = 32)
		let continuation = digit & 0b100000 != 0;
		value += (digit & 0b011111) << shift;
		shift += 5;

		if !continuation {
			// Lowest bit carries the sign
			let negated = value & 1 != 0;
			value >>= 1;
			if negated {
				value = -value;
			}
			values.push(i32::try_from(value).map_err(|_| SourceMapError::VlqOverflow)?);
			value = 0;
			shift = 0;
		}
	}

	if shift != 0 {
		return Err(SourceMapError::InvalidMappings(format!(
			"truncated VLQ value in segment '{segment}'"
		)));
	}

	Ok(values)
}

/// Position in an original source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
	/// Index into the sources array.
	pub source_index: u32,
	/// Line in the original file (0-indexed).
	pub original_line: u32,
	/// Column in the original file (0-indexed).
	pub original_column: u32,
	/// Optional index into the names array.
	pub name_index: Option<u32>,
}

/// A single mapping entry in the decoded source map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
	/// Line in the generated file (0-indexed).
	pub generated_line: u32,
	/// Column in the generated file (0-indexed).
	pub generated_column: u32,
	/// `None` for segments marking generated code with no original source.
	pub source: Option<SourceLocation>,
}

/// Container for decoded mappings with efficient lookup.
#[derive(Debug, Clone, Default)]
pub struct DecodedMappings {
	/// Mappings sorted by generated line, then generated column.
	mappings: Vec<Mapping>,
}

impl DecodedMappings {
	pub fn new() -> Self {
		Self {
			mappings: Vec::new(),
		}
	}

	pub fn add(&mut self, mapping: Mapping) {
		self.mappings.push(mapping);
	}

	fn sort(&mut self) {
		self.mappings
			.sort_by_key(|m| (m.generated_line, m.generated_column));
	}

	/// Find the mapping for a given generated line and column.
	/// Uses binary search to find the closest mapping at or before the given position.
	pub fn find(&self, line: u32, column: u32) -> Option<&Mapping> {
		let line_start = self
			.mappings
			.partition_point(|m| m.generated_line < line);
		let line_end = self
			.mappings
			.partition_point(|m| m.generated_line <= line);

		if line_start >= line_end {
			return None;
		}

		let line_mappings = &self.mappings[line_start..line_end];
		let idx = line_mappings.partition_point(|m| m.generated_column <= column);

		if idx == 0 {
			// Column is before all mappings on this line
			None
		} else {
			Some(&line_mappings[idx - 1])
		}
	}

	/// Find the closest mapping carrying a source at or before the given
	/// position, searching back across earlier lines.
	pub fn find_preceding_mapped(&self, line: u32, column: u32) -> Option<&Mapping> {
		let end = self
			.mappings
			.partition_point(|m| (m.generated_line, m.generated_column) <= (line, column));

		self.mappings[..end].iter().rev().find(|m| m.source.is_some())
	}

	pub fn len(&self) -> usize {
		self.mappings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.mappings.is_empty()
	}
}

fn to_u32(value: i64, what: &str) -> Result<u32> {
	u32::try_from(value)
		.map_err(|_| SourceMapError::InvalidMappings(format!("{what} out of range: {value}")))
}

/// Decode VLQ-encoded source map mappings string into structured form.
///
/// The mappings string format:
/// - Lines are separated by semicolons (;)
/// - Segments within a line are separated by commas (,)
/// - Each segment contains 1, 4, or 5 VLQ-encoded values
pub fn decode_vlq_mappings(mappings: &str) -> Result<DecodedMappings> {
	let mut result = DecodedMappings::new();
	let mut generated_line = 0u32;

	// Values are delta-encoded; source fields carry across lines
	let mut prev_source = 0i64;
	let mut prev_original_line = 0i64;
	let mut prev_original_column = 0i64;
	let mut prev_name = 0i64;

	for line in mappings.split(';') {
		let mut generated_column = 0i64;

		for segment in line.split(',') {
			if segment.is_empty() {
				continue;
			}

			let values = decode_vlq_segment(segment)?;

			if values.is_empty() {
				continue;
			}

			generated_column += i64::from(values[0]);

			let source = if values.len() >= 4 {
				prev_source += i64::from(values[1]);
				prev_original_line += i64::from(values[2]);
				prev_original_column += i64::from(values[3]);

				// Out-of-range names only lose the name, not the position
				let name_index = if values.len() >= 5 {
					prev_name += i64::from(values[4]);
					u32::try_from(prev_name).ok()
				} else {
					None
				};

				Some(SourceLocation {
					source_index: to_u32(prev_source, "source index")?,
					original_line: to_u32(prev_original_line, "original line")?,
					original_column: to_u32(prev_original_column, "original column")?,
					name_index,
				})
			} else {
				None
			};

			result.add(Mapping {
				generated_line,
				generated_column: to_u32(generated_column, "generated column")?,
				source,
			});
		}

		generated_line += 1;
	}

	result.sort();
	Ok(result)
}
