// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack symbolication for the Loom dev server.
//!
//! This crate provides functionality for:
//! - Reading bundles and source maps from a live [`ArtifactStore`]
//! - Locating a bundle's source map, tolerating a declared map name that
//!   does not match the emitted artifact ([`SourceMapResolver`])
//! - Parsing JavaScript source maps (v3) and decoding positions
//! - Mapping whole stack traces back to original sources ([`Symbolicator`])
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use loom_devserver_core::StackFrame;
//! use loom_devserver_symbolicate::{
//!     InMemoryArtifacts, Symbolicator, SymbolicatorOptions, TracingLogger,
//! };
//!
//! # tokio_test::block_on(async {
//! let artifacts = Arc::new(InMemoryArtifacts::new());
//! artifacts.insert("ios/main.bundle", "run();\n//# sourceMappingURL=main.map");
//! artifacts.insert(
//!     "ios/main.bundle.map",
//!     r#"{"version":3,"sources":["src/app.ts"],"names":[],"mappings":"AAAA"}"#,
//! );
//!
//! let symbolicator = Symbolicator::new(
//!     artifacts,
//!     Arc::new(TracingLogger),
//!     SymbolicatorOptions::default(),
//! );
//!
//! let frames = vec![StackFrame::new("http://localhost:8081/ios/main.bundle", 1, 0)];
//! let resolved = symbolicator.process(&frames).await.unwrap();
//! assert_eq!(resolved[0].original_file, "src/app.ts");
//! # });
//! ```

pub mod artifacts;
pub mod customize;
pub mod error;
pub mod logger;
pub mod resolver;
pub mod sourcemap;
pub mod symbolicator;
pub mod vlq;

pub use artifacts::{ArtifactStore, DirectoryArtifacts, InMemoryArtifacts};
pub use customize::CollapseRules;
pub use error::{ArtifactError, ResolveError, Result, SourceMapError, SymbolicateError};
pub use logger::{LogBuffer, LogEntry, LogLevel, Logger, TracingLogger};
pub use resolver::{find_source_mapping_url, SourceMapResolver};
pub use sourcemap::{extract_context, Lookup, OriginalPosition, ParsedSourceMap};
pub use symbolicator::{Symbolicator, SymbolicatorOptions, DEFAULT_CONTEXT_LINES};
pub use vlq::{decode_vlq_mappings, decode_vlq_segment, DecodedMappings, Mapping, SourceLocation};
