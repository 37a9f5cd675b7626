// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack symbolication across bundles.
//!
//! Frames are grouped by the bundle they executed in so each bundle's source
//! map is resolved and parsed once per request. Groups resolve concurrently;
//! the output is reassembled in input order.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use loom_devserver_core::{BundleKey, CodeContext, ResolvedFrame, StackFrame};
use tracing::{debug, instrument};

use crate::artifacts::ArtifactStore;
use crate::customize::CollapseRules;
use crate::error::{Result, SourceMapError};
use crate::logger::{LogEntry, LogLevel, Logger};
use crate::resolver::SourceMapResolver;
use crate::sourcemap::{extract_context, Lookup, OriginalPosition, ParsedSourceMap};

/// Default number of source lines shown around a resolved position.
pub const DEFAULT_CONTEXT_LINES: usize = 5;

/// Tunables for [`Symbolicator`].
#[derive(Debug, Clone)]
pub struct SymbolicatorOptions {
	/// Lines of embedded source to attach on each side; 0 disables context.
	pub context_lines: usize,
	pub collapse: CollapseRules,
}

impl Default for SymbolicatorOptions {
	fn default() -> Self {
		Self {
			context_lines: DEFAULT_CONTEXT_LINES,
			collapse: CollapseRules::none(),
		}
	}
}

/// Frames of one request that share a bundle.
struct BundleGroup {
	key: BundleKey,
	indices: Vec<usize>,
}

/// Maps runtime stack frames back to original source positions.
#[derive(Clone)]
pub struct Symbolicator {
	store: Arc<dyn ArtifactStore>,
	resolver: SourceMapResolver,
	logger: Arc<dyn Logger>,
	options: Arc<SymbolicatorOptions>,
}

impl Symbolicator {
	pub fn new(
		store: Arc<dyn ArtifactStore>,
		logger: Arc<dyn Logger>,
		options: SymbolicatorOptions,
	) -> Self {
		Self {
			resolver: SourceMapResolver::new(store.clone(), logger.clone()),
			store,
			logger,
			options: Arc::new(options),
		}
	}

	/// Symbolicate `frames`, returning one resolved frame per input frame in
	/// the same order.
	///
	/// Bundles whose artifact or map cannot be found, or whose map is corrupt,
	/// yield collapsed frames carrying the input position. Only store failures
	/// fail the whole request.
	#[instrument(skip(self, frames), fields(frame_count = frames.len()))]
	pub async fn process(&self, frames: &[StackFrame]) -> Result<Vec<ResolvedFrame>> {
		let mut resolved: Vec<ResolvedFrame> = frames.iter().map(ResolvedFrame::unmapped).collect();
		let groups = self.group_by_bundle(frames);

		let maps = join_all(groups.iter().map(|group| self.resolver.resolve(&group.key))).await;

		for (group, outcome) in groups.iter().zip(maps) {
			let bytes = match outcome {
				Ok(bytes) => bytes,
				Err(e) if e.is_recoverable() => {
					self.logger.log(
						LogEntry::new(LogLevel::Debug, module_path!(), "leaving bundle frames unmapped")
							.field("bundle", &group.key)
							.field("frames", group.indices.len())
							.field("reason", &e),
					);
					continue;
				}
				Err(e) => return Err(e.into()),
			};

			match self.map_group(&bytes, &group.indices, frames) {
				Ok(mapped) => {
					for (&index, frame) in group.indices.iter().zip(mapped) {
						resolved[index] = frame;
					}
				}
				Err(e) => {
					self.logger.log(
						LogEntry::warn(module_path!(), "source map unusable, leaving bundle frames unmapped")
							.field("bundle", &group.key)
							.field("frames", group.indices.len())
							.field("error", &e),
					);
				}
			}
		}

		Ok(resolved)
	}

	/// Partition frames by bundle key, keeping first-seen order.
	fn group_by_bundle(&self, frames: &[StackFrame]) -> Vec<BundleGroup> {
		let mut groups: Vec<BundleGroup> = Vec::new();
		let mut by_key: HashMap<BundleKey, usize> = HashMap::new();

		for (index, frame) in frames.iter().enumerate() {
			let key = match self.store.resolve_path_from_url(&frame.bundle_url) {
				Ok(key) => key,
				Err(e) => {
					debug!(url = %frame.bundle_url, error = %e, "frame has no bundle key");
					continue;
				}
			};

			match by_key.get(&key) {
				Some(&group) => groups[group].indices.push(index),
				None => {
					by_key.insert(key.clone(), groups.len());
					groups.push(BundleGroup {
						key,
						indices: vec![index],
					});
				}
			}
		}

		groups
	}

	/// Map every frame of one bundle, all or nothing.
	fn map_group(
		&self,
		bytes: &[u8],
		indices: &[usize],
		frames: &[StackFrame],
	) -> std::result::Result<Vec<ResolvedFrame>, SourceMapError> {
		let map = ParsedSourceMap::from_bytes(bytes)?;
		indices
			.iter()
			.map(|&index| self.map_frame(&map, &frames[index]))
			.collect()
	}

	fn map_frame(
		&self,
		map: &ParsedSourceMap,
		frame: &StackFrame,
	) -> std::result::Result<ResolvedFrame, SourceMapError> {
		let resolved = match map.lookup(frame.line, frame.column)? {
			Lookup::Exact(position) => {
				let context = self.code_context(&position);
				let mut resolved = resolved_from(position, frame, false);
				resolved.collapsed = self.options.collapse.matches(&resolved.original_file);
				if !resolved.collapsed {
					resolved.context = context;
				}
				resolved
			}
			Lookup::Nearest(position) => resolved_from(position, frame, true),
			Lookup::Unmapped => ResolvedFrame::unmapped(frame),
		};
		Ok(resolved)
	}

	fn code_context(&self, position: &OriginalPosition<'_>) -> Option<CodeContext> {
		if self.options.context_lines == 0 {
			return None;
		}
		extract_context(
			position.source_content?,
			position.line as usize,
			self.options.context_lines,
		)
	}
}

fn resolved_from(position: OriginalPosition<'_>, frame: &StackFrame, collapsed: bool) -> ResolvedFrame {
	ResolvedFrame {
		original_file: position.source,
		original_line: position.line,
		original_column: position.column,
		method_name: position
			.name
			.map(str::to_string)
			.or_else(|| frame.method_name.clone()),
		collapsed,
		context: None,
	}
}
