// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for core symbolication types.

use thiserror::Error;

/// Errors raised while interpreting client-supplied stack data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
	#[error("invalid bundle URL: {0}")]
	InvalidBundleUrl(String),

	#[error("invalid stack frame: {0}")]
	InvalidFrame(String),

	#[error("invalid platform: {0}")]
	InvalidPlatform(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
