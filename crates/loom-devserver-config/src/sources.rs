// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	ArtifactsConfigLayer, HttpConfigLayer, LogFormat, LoggingConfigLayer, SymbolicatorConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/loom/devserver.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: LOOM_DEVSERVER_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			artifacts: Some(load_artifacts_from_env()),
			symbolicator: Some(load_symbolicator_from_env()?),
			logging: Some(load_logging_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_u16(name: &str) -> Result<Option<u16>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u16 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_usize(name: &str) -> Result<Option<usize>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid unsigned integer '{v}'"),
		}),
		None => Ok(None),
	}
}

fn split_list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(|s| s.trim().to_string())
		.filter(|s| !s.is_empty())
		.collect()
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("LOOM_DEVSERVER_HOST"),
		port: env_u16("LOOM_DEVSERVER_PORT")?,
	})
}

fn load_artifacts_from_env() -> ArtifactsConfigLayer {
	ArtifactsConfigLayer {
		root_dir: env_var("LOOM_DEVSERVER_ARTIFACTS_ROOT").map(PathBuf::from),
	}
}

fn load_symbolicator_from_env() -> Result<SymbolicatorConfigLayer, ConfigError> {
	Ok(SymbolicatorConfigLayer {
		context_lines: env_usize("LOOM_DEVSERVER_CONTEXT_LINES")?,
		collapse_patterns: env_var("LOOM_DEVSERVER_COLLAPSE_PATTERNS").map(|s| split_list(&s)),
	})
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	let format = match env_var("LOOM_DEVSERVER_LOG_FORMAT") {
		Some(v) => Some(v.parse::<LogFormat>().map_err(|message| ConfigError::InvalidValue {
			key: "LOOM_DEVSERVER_LOG_FORMAT".to_string(),
			message,
		})?),
		None => None,
	};

	Ok(LoggingConfigLayer {
		level: env_var("LOOM_DEVSERVER_LOG_LEVEL"),
		format,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_precedence_order() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}

	#[test]
	fn test_split_list_trims_and_drops_empty() {
		assert_eq!(
			split_list(" a/b , ,c "),
			vec!["a/b".to_string(), "c".to_string()]
		);
	}

	#[test]
	fn test_missing_toml_file_is_empty_layer() {
		let source = TomlSource::new("/nonexistent/loom/devserver.toml");
		assert_eq!(source.load().unwrap(), ServerConfigLayer::default());
	}

	#[test]
	fn test_toml_file_is_parsed() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[http]
port = 19000

[symbolicator]
context_lines = 2
collapse_patterns = ["/vendor/"]

[logging]
format = "json"
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(layer.http.unwrap().port, Some(19000));
		let symbolicator = layer.symbolicator.unwrap();
		assert_eq!(symbolicator.context_lines, Some(2));
		assert_eq!(
			symbolicator.collapse_patterns,
			Some(vec!["/vendor/".to_string()])
		);
		assert_eq!(layer.logging.unwrap().format, Some(LogFormat::Json));
		assert!(layer.artifacts.is_none());
	}

	#[test]
	fn test_malformed_toml_file_errors() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[http\nport = ").unwrap();

		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}
}
