// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the dev server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use loom_devserver_config::ConfigError;
use thiserror::Error;

/// Failures while assembling or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),

	#[error("invalid collapse pattern: {0}")]
	CollapsePattern(#[from] regex::Error),

	#[error("lifecycle hook '{name}' failed: {message}")]
	Hook { name: &'static str, message: String },

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

/// Outcome of a rejected `/symbolicate` request.
///
/// Every variant renders as a bare status code; details go to the log only.
#[derive(Debug, Error)]
pub enum EndpointError {
	#[error("malformed request: {0}")]
	MalformedRequest(String),

	#[error("platform could not be inferred from stack")]
	UnknownPlatform,

	#[error("symbolication failed")]
	Internal,
}

impl EndpointError {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::MalformedRequest(_) | Self::UnknownPlatform => StatusCode::BAD_REQUEST,
			Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for EndpointError {
	fn into_response(self) -> Response {
		self.status().into_response()
	}
}
