// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build artifact location.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArtifactsConfigLayer {
	pub root_dir: Option<PathBuf>,
}

impl ArtifactsConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.root_dir.is_some() {
			self.root_dir = other.root_dir;
		}
	}

	pub fn finalize(self) -> ArtifactsConfig {
		ArtifactsConfig {
			root_dir: self.root_dir.unwrap_or_else(|| PathBuf::from("./dist")),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactsConfig {
	/// Directory the build writes bundles and source maps into.
	pub root_dir: PathBuf,
}

impl Default for ArtifactsConfig {
	fn default() -> Self {
		ArtifactsConfigLayer::default().finalize()
	}
}
