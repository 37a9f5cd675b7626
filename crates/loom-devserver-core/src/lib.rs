// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Loom dev server stack symbolication.
//!
//! This crate provides the shared vocabulary of the symbolication subsystem:
//! - [`StackFrame`] - a runtime frame reported by a running client
//! - [`ResolvedFrame`] - the frame mapped back to original source
//! - [`BundleKey`] - the artifact-store path a bundle URL resolves to
//! - [`Platform`] and [`infer_platform_from_stack`] - platform classification
//!
//! Nothing in here performs I/O.

pub mod bundle;
pub mod error;
pub mod frame;
pub mod platform;

pub use bundle::BundleKey;
pub use error::{CoreError, Result};
pub use frame::{CodeContext, ResolvedFrame, StackFrame};
pub use platform::{infer_platform_from_stack, Platform};
