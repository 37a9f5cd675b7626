// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Liveness endpoint.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::shell::RouteRegistration;
use crate::version::VERSION;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
	pub version: &'static str,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok",
		version: VERSION,
	})
}

pub fn register() -> RouteRegistration {
	Box::new(|router: Router| router.route("/health", get(health_check)))
}
