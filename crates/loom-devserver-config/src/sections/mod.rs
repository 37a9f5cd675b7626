// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod artifacts;
mod http;
mod logging;
mod symbolicator;

pub use artifacts::{ArtifactsConfig, ArtifactsConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use symbolicator::{SymbolicatorConfig, SymbolicatorConfigLayer, DEFAULT_COLLAPSE_PATTERNS};
