// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `POST /symbolicate`: maps a runtime stack back to original sources.

use axum::{
	extract::{rejection::BytesRejection, DefaultBodyLimit, State},
	routing::post,
	Json, Router,
};
use bytes::Bytes;
use loom_devserver_core::{infer_platform_from_stack, ResolvedFrame, StackFrame};
use loom_devserver_symbolicate::LogEntry;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::EndpointError;
use crate::shell::RouteRegistration;
use crate::state::AppState;

const LOG_TARGET: &str = "loom_devserver::symbolicate";

/// Largest accepted request body. Larger bodies are rejected as malformed.
pub const MAX_REQUEST_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct SymbolicateRequest {
	pub stack: Vec<StackFrame>,
}

/// Decode and validate a request body.
///
/// The body is taken as raw bytes so that a missing content type or
/// undecodable JSON ends up here instead of in an extractor rejection.
pub fn parse_request(body: &[u8]) -> Result<SymbolicateRequest, EndpointError> {
	let request: SymbolicateRequest = serde_json::from_slice(body)
		.map_err(|e| EndpointError::MalformedRequest(e.to_string()))?;

	for (index, frame) in request.stack.iter().enumerate() {
		frame
			.validate()
			.map_err(|e| EndpointError::MalformedRequest(format!("frame {index}: {e}")))?;
	}

	Ok(request)
}

/// POST /symbolicate
#[instrument(skip(state, body))]
pub async fn symbolicate(
	State(state): State<AppState>,
	body: Result<Bytes, BytesRejection>,
) -> Result<Json<Vec<ResolvedFrame>>, EndpointError> {
	let request = body
		.map_err(|e| EndpointError::MalformedRequest(e.body_text()))
		.and_then(|body| parse_request(&body))
		.inspect_err(|e| {
			state
				.logger
				.log(LogEntry::warn(LOG_TARGET, "rejected symbolication request").field("error", e));
		})?;

	let platform =
		infer_platform_from_stack(&request.stack).ok_or(EndpointError::UnknownPlatform)?;
	debug!(%platform, frames = request.stack.len(), "symbolicating stack");

	let frames = state
		.symbolicator
		.process(&request.stack)
		.await
		.map_err(|e| {
			state.logger.log(
				LogEntry::error(LOG_TARGET, "symbolication failed")
					.field("platform", platform)
					.field("error", &e),
			);
			EndpointError::Internal
		})?;

	Ok(Json(frames))
}

pub fn register(state: AppState) -> RouteRegistration {
	Box::new(move |router: Router| {
		let routes: Router = Router::new()
			.route("/symbolicate", post(symbolicate))
			.layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
			.with_state(state);
		router.merge(routes)
	})
}
