// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build information for loom-devserver.

/// Crate version reported by `/health` and `loom-devserver version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format version info for display.
pub fn format_version_info() -> String {
	format!(
		"loom-devserver version: {}\n\
         Platform:               {}-{}",
		VERSION,
		std::env::consts::OS,
		std::env::consts::ARCH,
	)
}
