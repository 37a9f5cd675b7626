// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server shell: composes route registrations and lifecycle hooks.
//!
//! Feature modules never own the server. Each contributes a
//! [`RouteRegistration`] that adds its routes to the shared [`Router`], and
//! optionally a [`LifecycleHook`] that runs around the serve loop.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing::{debug, error, info};

use crate::error::ServerError;

/// Adds one module's routes to the router.
pub type RouteRegistration = Box<dyn FnOnce(Router) -> Router + Send>;

/// Start/stop callbacks run by [`ServerShell::serve`].
#[async_trait]
pub trait LifecycleHook: Send + Sync {
	fn name(&self) -> &'static str;

	/// Runs before the listener accepts connections. An error aborts startup.
	async fn on_start(&self) -> Result<(), ServerError> {
		Ok(())
	}

	/// Runs after the serve loop has drained.
	async fn on_shutdown(&self) {}
}

#[derive(Default)]
pub struct ServerShell {
	routes: Vec<RouteRegistration>,
	hooks: Vec<Arc<dyn LifecycleHook>>,
}

impl ServerShell {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn route(mut self, registration: RouteRegistration) -> Self {
		self.routes.push(registration);
		self
	}

	pub fn hook(mut self, hook: Arc<dyn LifecycleHook>) -> Self {
		self.hooks.push(hook);
		self
	}

	/// Compose all registrations into a router without running any hooks.
	pub fn into_router(self) -> Router {
		compose(self.routes)
	}

	/// Run start hooks, serve until `shutdown` resolves, then run shutdown
	/// hooks in reverse order.
	///
	/// If a start hook fails, the hooks already started are shut down and the
	/// error is returned without serving.
	pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
	where
		F: Future<Output = ()> + Send + 'static,
	{
		let Self { routes, hooks } = self;

		let mut started: Vec<Arc<dyn LifecycleHook>> = Vec::with_capacity(hooks.len());
		for hook in hooks {
			debug!(hook = hook.name(), "running start hook");
			if let Err(e) = hook.on_start().await {
				error!(hook = hook.name(), error = %e, "start hook failed");
				shutdown_hooks(&started).await;
				return Err(e);
			}
			started.push(hook);
		}

		let router = compose(routes);
		info!(addr = %listener.local_addr()?, "listening");

		let result = axum::serve(listener, router)
			.with_graceful_shutdown(shutdown)
			.await;

		shutdown_hooks(&started).await;
		info!("server shutdown complete");
		result.map_err(ServerError::from)
	}
}

fn compose(routes: Vec<RouteRegistration>) -> Router {
	routes
		.into_iter()
		.fold(Router::new(), |router, register| register(router))
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		)
}

async fn shutdown_hooks(hooks: &[Arc<dyn LifecycleHook>]) {
	for hook in hooks.iter().rev() {
		debug!(hook = hook.name(), "running shutdown hook");
		hook.on_shutdown().await;
	}
}
