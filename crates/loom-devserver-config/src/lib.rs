// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the Loom dev server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Validation of listener and symbolicator settings
//! - Consistent environment variable naming (`LOOM_DEVSERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use loom_devserver_config::load_config;
//!
//! let config = load_config()?;
//! println!("Serving {} on {}", config.artifacts.root_dir.display(), config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use std::path::PathBuf;

use regex::Regex;
use tracing::{debug, info};

/// Fully resolved dev server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub artifacts: ArtifactsConfig,
	pub symbolicator: SymbolicatorConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`LOOM_DEVSERVER_*`)
/// 2. Config file (`/etc/loom/devserver.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Load configuration from environment only.
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let config = ServerConfig {
		http: layer.http.unwrap_or_default().finalize(),
		artifacts: layer.artifacts.unwrap_or_default().finalize(),
		symbolicator: layer.symbolicator.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	info!(
		host = %config.http.host,
		port = config.http.port,
		artifacts_root = %config.artifacts.root_dir.display(),
		context_lines = config.symbolicator.context_lines,
		collapse_patterns = config.symbolicator.collapse_patterns.len(),
		log_format = %config.logging.format,
		"Dev server configuration loaded"
	);

	Ok(config)
}

fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
	if config.http.port == 0 {
		return Err(ConfigError::Validation(
			"http.port must be non-zero".to_string(),
		));
	}

	for pattern in &config.symbolicator.collapse_patterns {
		Regex::new(pattern).map_err(|e| ConfigError::InvalidValue {
			key: "symbolicator.collapse_patterns".to_string(),
			message: format!("'{pattern}': {e}"),
		})?;
	}

	Ok(())
}
