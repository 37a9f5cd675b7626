// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for source map resolution and symbolication.

use loom_devserver_core::BundleKey;
use thiserror::Error;

/// Errors raised while parsing or querying a source map document.
#[derive(Debug, Error)]
pub enum SourceMapError {
	#[error("Invalid source map JSON: {0}")]
	InvalidJson(#[from] serde_json::Error),

	#[error("Invalid source map version: expected 3, got {0}")]
	InvalidVersion(u32),

	#[error("Invalid VLQ character: {0}")]
	InvalidVlqChar(char),

	#[error("VLQ value out of range")]
	VlqOverflow,

	#[error("Invalid mappings: {0}")]
	InvalidMappings(String),

	#[error("Invalid source index: {0}")]
	InvalidSourceIndex(u32),
}

/// Errors raised by an artifact store read.
#[derive(Debug, Error)]
pub enum ArtifactError {
	#[error("artifact not found: {0}")]
	NotFound(String),

	#[error("failed to read artifact {path}: {source}")]
	Io {
		path: String,
		#[source]
		source: std::io::Error,
	},
}

impl ArtifactError {
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound(_))
	}
}

/// Outcome of a failed source map resolution for one bundle.
#[derive(Debug, Error)]
pub enum ResolveError {
	#[error("bundle not found in artifact store: {0}")]
	ArtifactNotFound(BundleKey),

	#[error("no source map found for bundle: {0}")]
	SourceMapNotFound(BundleKey),

	#[error("artifact store failure: {0}")]
	Store(#[from] ArtifactError),
}

impl ResolveError {
	/// Whether the failure only affects frames of this bundle.
	pub fn is_recoverable(&self) -> bool {
		matches!(self, Self::ArtifactNotFound(_) | Self::SourceMapNotFound(_))
	}
}

/// Request-level symbolication failures.
#[derive(Debug, Error)]
pub enum SymbolicateError {
	#[error("source map resolution failed: {0}")]
	Resolve(#[from] ResolveError),
}

pub type Result<T> = std::result::Result<T, SymbolicateError>;
