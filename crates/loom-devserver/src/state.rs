// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use loom_devserver_symbolicate::{ArtifactStore, Logger, Symbolicator, SymbolicatorOptions};

/// Shared state for the symbolication routes.
#[derive(Clone)]
pub struct AppState {
	pub symbolicator: Symbolicator,
	pub logger: Arc<dyn Logger>,
}

impl AppState {
	pub fn new(
		store: Arc<dyn ArtifactStore>,
		logger: Arc<dyn Logger>,
		options: SymbolicatorOptions,
	) -> Self {
		Self {
			symbolicator: Symbolicator::new(store, logger.clone(), options),
			logger,
		}
	}
}
