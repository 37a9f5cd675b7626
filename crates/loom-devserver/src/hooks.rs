// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lifecycle hooks shipped with the dev server.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::ServerError;
use crate::shell::LifecycleHook;

/// Checks the artifact root on startup.
///
/// A missing root is only a warning: the build may not have written its
/// first output yet. A root that exists but is not a directory is fatal.
pub struct ArtifactRootCheck {
	root: PathBuf,
}

impl ArtifactRootCheck {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}
}

#[async_trait]
impl LifecycleHook for ArtifactRootCheck {
	fn name(&self) -> &'static str {
		"artifact-root"
	}

	async fn on_start(&self) -> Result<(), ServerError> {
		match tokio::fs::metadata(&self.root).await {
			Ok(meta) if meta.is_dir() => {
				info!(root = %self.root.display(), "serving build artifacts");
				Ok(())
			}
			Ok(_) => Err(ServerError::Hook {
				name: self.name(),
				message: format!("{} is not a directory", self.root.display()),
			}),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {
				warn!(
					root = %self.root.display(),
					"artifact root does not exist yet, bundles will be reported missing"
				);
				Ok(())
			}
			Err(e) => Err(ServerError::Io(e)),
		}
	}
}
