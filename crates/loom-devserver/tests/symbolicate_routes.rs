// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route tests for `/symbolicate` and `/health` against the composed router.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use loom_devserver::routes::symbolicate::MAX_REQUEST_BYTES;
use loom_devserver::{build_shell, AppState};
use loom_devserver_symbolicate::{
	ArtifactError, ArtifactStore, InMemoryArtifacts, LogBuffer, LogLevel, SymbolicatorOptions,
};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Map for `ios/main.bundle`: generated 42:7 maps to `src/index.ts` 10:4.
fn index_map() -> String {
	json!({
		"version": 3,
		"sources": ["src/index.ts"],
		"sourcesContent": [(1..=20).map(|n| format!("line {n}")).collect::<Vec<_>>().join("\n")],
		"names": [],
		"mappings": format!("{}OASI", ";".repeat(41)),
	})
	.to_string()
}

fn app(store: Arc<InMemoryArtifacts>) -> (Router, LogBuffer) {
	let logs = LogBuffer::new(64);
	let state = AppState::new(store, Arc::new(logs.clone()), SymbolicatorOptions::default());
	(build_shell(state).into_router(), logs)
}

fn ios_store() -> Arc<InMemoryArtifacts> {
	let store = Arc::new(InMemoryArtifacts::new());
	store.insert("ios/main.bundle", "__d();\n//# sourceMappingURL=main.map");
	store.insert("ios/main.bundle.map", index_map());
	store
}

async fn post(router: Router, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
	let response = router
		.oneshot(
			Request::post("/symbolicate")
				.header("content-type", "application/json")
				.body(body.into())
				.unwrap(),
		)
		.await
		.unwrap();
	let status = response.status();
	let body = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	(status, body.to_vec())
}

fn frame(file: &str, line: u32, column: u32) -> Value {
	json!({ "file": file, "lineNumber": line, "column": column })
}

#[tokio::test]
async fn test_health() {
	let (router, _logs) = app(ios_store());
	let response = router
		.oneshot(Request::get("/health").body(Body::empty()).unwrap())
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);

	let body = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	let health: Value = serde_json::from_slice(&body).unwrap();
	assert_eq!(health["status"], "ok");
	assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_declared_map_mismatch_falls_back() {
	let (router, logs) = app(ios_store());
	let body = json!({ "stack": [frame("http://host/ios/main.bundle", 42, 7)] });

	let (status, body) = post(router, body.to_string()).await;

	assert_eq!(status, StatusCode::OK);
	let frames: Value = serde_json::from_slice(&body).unwrap();
	let frames = frames.as_array().unwrap();
	assert_eq!(frames.len(), 1);
	assert_eq!(frames[0]["originalFile"], "src/index.ts");
	assert_eq!(frames[0]["originalLine"], 10);
	assert_eq!(frames[0]["originalColumn"], 4);
	assert_eq!(frames[0]["collapsed"], false);
	assert_eq!(frames[0]["context"]["contextLine"], "line 10");
	assert!(frames[0].get("methodName").is_none());

	let warnings = logs.entries_at(LogLevel::Warn);
	assert_eq!(warnings.len(), 1);
	assert_eq!(warnings[0].get("declared"), Some("main.map"));
	assert_eq!(warnings[0].get("attempted"), Some("ios/main.map"));
}

#[tokio::test]
async fn test_missing_bundle_frames_are_collapsed() {
	let store = ios_store();
	store.insert("ios/other.bundle", "x();");
	let (router, _logs) = app(store);
	let body = json!({
		"stack": [
			frame("http://host/ios/other.bundle", 3, 1),
			{ "file": "http://host/ios/main.bundle", "lineNumber": 42, "column": 7, "methodName": "onPress" },
			frame("http://host/ios/deleted.bundle", 9, 2),
		]
	});

	let (status, body) = post(router, body.to_string()).await;

	assert_eq!(status, StatusCode::OK);
	let frames: Value = serde_json::from_slice(&body).unwrap();
	assert_eq!(
		frames[0],
		json!({
			"originalFile": "http://host/ios/other.bundle",
			"originalLine": 3,
			"originalColumn": 1,
			"collapsed": true,
		})
	);
	assert_eq!(frames[1]["collapsed"], false);
	assert_eq!(frames[1]["methodName"], "onPress");
	assert_eq!(frames[2]["collapsed"], true);
	assert_eq!(frames[2]["originalLine"], 9);
	assert_eq!(frames[2]["originalColumn"], 2);
}

#[tokio::test]
async fn test_malformed_bodies_are_rejected() {
	for body in [
		"not json".to_string(),
		json!({}).to_string(),
		json!({ "stack": 7 }).to_string(),
		json!({ "stack": [frame("http://host/ios/main.bundle", 0, 0)] }).to_string(),
	] {
		let (router, logs) = app(ios_store());
		let (status, response) = post(router, body.clone()).await;

		assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
		assert!(response.is_empty());
		assert_eq!(logs.entries_at(LogLevel::Warn).len(), 1);
		assert!(logs.entries_at(LogLevel::Error).is_empty());
	}
}

#[tokio::test]
async fn test_missing_content_type_is_still_parsed() {
	let (router, _logs) = app(ios_store());
	let response = router
		.oneshot(
			Request::post("/symbolicate")
				.body(Body::from(
					json!({ "stack": [frame("http://host/ios/main.bundle", 42, 7)] }).to_string(),
				))
				.unwrap(),
		)
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_platform_is_rejected() {
	for stack in [
		json!([]),
		json!([frame("http://host/main.bundle", 1, 0)]),
		json!([
			frame("http://host/ios/main.bundle", 1, 0),
			frame("http://host/index.bundle?platform=android", 1, 0),
		]),
	] {
		let (router, logs) = app(ios_store());
		let (status, response) = post(router, json!({ "stack": stack }).to_string()).await;

		assert_eq!(status, StatusCode::BAD_REQUEST, "stack: {stack}");
		assert!(response.is_empty());
		assert!(logs.entries_at(LogLevel::Error).is_empty());
	}
}

#[tokio::test]
async fn test_corrupt_map_collapses_only_its_frames() {
	let store = ios_store();
	store.insert("ios/vendor.bundle", "run();");
	store.insert("ios/vendor.bundle.map", "{\"version\": 3, \"sources\": [");
	let (router, logs) = app(store);
	let body = json!({
		"stack": [
			frame("http://host/ios/vendor.bundle?platform=ios", 1, 0),
			frame("http://host/ios/main.bundle?platform=ios", 42, 7),
		]
	});

	let (status, response) = post(router, body.to_string()).await;

	assert_eq!(status, StatusCode::OK);
	let frames: Value = serde_json::from_slice(&response).unwrap();
	assert_eq!(frames[0]["collapsed"], true);
	assert_eq!(frames[0]["originalFile"], "http://host/ios/vendor.bundle?platform=ios");
	assert_eq!(frames[1]["originalFile"], "src/index.ts");
	assert_eq!(frames[1]["originalLine"], 10);
	assert!(logs.entries_at(LogLevel::Error).is_empty());
	let vendor_warnings = logs
		.entries_at(LogLevel::Warn)
		.into_iter()
		.filter(|entry| entry.get("bundle") == Some("ios/vendor.bundle"))
		.count();
	assert_eq!(vendor_warnings, 1);
}

struct UnreadableStore;

#[async_trait]
impl ArtifactStore for UnreadableStore {
	async fn read_file(&self, path: &str) -> Result<Bytes, ArtifactError> {
		Err(ArtifactError::Io {
			path: path.to_string(),
			source: std::io::Error::other("permission denied"),
		})
	}
}

#[tokio::test]
async fn test_store_failure_is_server_error() {
	let logs = LogBuffer::new(64);
	let state = AppState::new(
		Arc::new(UnreadableStore),
		Arc::new(logs.clone()),
		SymbolicatorOptions::default(),
	);
	let router = build_shell(state).into_router();
	let body = json!({ "stack": [frame("http://host/web/app.bundle", 1, 0)] });

	let (status, response) = post(router, body.to_string()).await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert!(response.is_empty());
	let errors = logs.entries_at(LogLevel::Error);
	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0].get("platform"), Some("web"));
}

#[tokio::test]
async fn test_oversized_body_is_rejected_without_text() {
	let (router, logs) = app(ios_store());
	let body = vec![b' '; MAX_REQUEST_BYTES + 1];

	let (status, response) = post(router, body).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(response.is_empty());
	assert_eq!(logs.entries_at(LogLevel::Warn).len(), 1);
}

#[tokio::test]
async fn test_wrong_method_is_not_allowed() {
	let (router, _logs) = app(ios_store());
	let response = router
		.oneshot(Request::get("/symbolicate").body(Body::empty()).unwrap())
		.await
		.unwrap();
	assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
