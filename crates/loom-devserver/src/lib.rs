// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loom dev server: symbolication of runtime stacks against live build output.
//!
//! The server is assembled from a [`ServerShell`] and the registrations each
//! module contributes. [`build_shell`] wires the default set.

pub mod error;
pub mod hooks;
pub mod routes;
pub mod shell;
pub mod state;
pub mod version;

pub use error::{EndpointError, ServerError};
pub use hooks::ArtifactRootCheck;
pub use shell::{LifecycleHook, RouteRegistration, ServerShell};
pub use state::AppState;

use loom_devserver_config::SymbolicatorConfig;
use loom_devserver_symbolicate::{CollapseRules, SymbolicatorOptions};

/// Turn the symbolicator config section into runtime options.
pub fn symbolicator_options(config: &SymbolicatorConfig) -> Result<SymbolicatorOptions, ServerError> {
	Ok(SymbolicatorOptions {
		context_lines: config.context_lines,
		collapse: CollapseRules::new(&config.collapse_patterns)?,
	})
}

/// Shell with the health and symbolication routes registered.
pub fn build_shell(state: AppState) -> ServerShell {
	ServerShell::new()
		.route(routes::health::register())
		.route(routes::symbolicate::register(state))
}
