// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read access to the build outputs the dev server is currently holding.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use loom_devserver_core::BundleKey;
use parking_lot::RwLock;
use tracing::trace;

use crate::error::ArtifactError;

/// Store of build artifacts, addressed by normalized path.
///
/// Content may disappear or change between calls while a rebuild is running.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
	/// Read the artifact at `path`, failing with [`ArtifactError::NotFound`]
	/// when the store does not currently hold it.
	async fn read_file(&self, path: &str) -> Result<Bytes, ArtifactError>;

	/// Map a request URL into the store's key space.
	fn resolve_path_from_url(&self, url: &str) -> loom_devserver_core::Result<BundleKey> {
		BundleKey::from_url(url)
	}
}

/// Artifact store backed by a map, written to by an in-process build.
#[derive(Debug, Default)]
pub struct InMemoryArtifacts {
	files: RwLock<HashMap<String, Bytes>>,
}

impl InMemoryArtifacts {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert or replace an artifact.
	pub fn insert(&self, path: impl Into<String>, content: impl Into<Bytes>) {
		self.files.write().insert(path.into(), content.into());
	}

	pub fn remove(&self, path: &str) -> Option<Bytes> {
		self.files.write().remove(path)
	}

	/// Drop every artifact, as when a new build starts from scratch.
	pub fn clear(&self) {
		self.files.write().clear();
	}

	pub fn len(&self) -> usize {
		self.files.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.files.read().is_empty()
	}
}

#[async_trait]
impl ArtifactStore for InMemoryArtifacts {
	async fn read_file(&self, path: &str) -> Result<Bytes, ArtifactError> {
		self.files
			.read()
			.get(path)
			.cloned()
			.ok_or_else(|| ArtifactError::NotFound(path.to_string()))
	}
}

/// Artifact store reading from the build's output directory.
#[derive(Debug, Clone)]
pub struct DirectoryArtifacts {
	root: PathBuf,
}

impl DirectoryArtifacts {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Resolve `path` under the root, refusing anything that is not a plain
	/// relative path.
	fn full_path(&self, path: &str) -> Option<PathBuf> {
		let relative = Path::new(path);
		if relative
			.components()
			.all(|c| matches!(c, Component::Normal(_)))
		{
			Some(self.root.join(relative))
		} else {
			None
		}
	}
}

#[async_trait]
impl ArtifactStore for DirectoryArtifacts {
	async fn read_file(&self, path: &str) -> Result<Bytes, ArtifactError> {
		let full_path = self
			.full_path(path)
			.ok_or_else(|| ArtifactError::NotFound(path.to_string()))?;

		trace!(path = %full_path.display(), "reading artifact");
		match tokio::fs::read(&full_path).await {
			Ok(content) => Ok(Bytes::from(content)),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				Err(ArtifactError::NotFound(path.to_string()))
			}
			Err(e) => Err(ArtifactError::Io {
				path: path.to_string(),
				source: e,
			}),
		}
	}
}
