// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loom dev server binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use loom_devserver::{build_shell, symbolicator_options, AppState, ArtifactRootCheck};
use loom_devserver_config::LogFormat;
use loom_devserver_symbolicate::{DirectoryArtifacts, TracingLogger};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Loom dev server - symbolicates runtime stacks against live build output.
#[derive(Parser, Debug)]
#[command(name = "loom-devserver", about = "Loom dev server", version)]
struct Args {
	/// Config file (defaults to /etc/loom/devserver.toml)
	#[arg(long, env = "LOOM_DEVSERVER_CONFIG")]
	config: Option<PathBuf>,

	/// Address to bind, overrides config
	#[arg(long)]
	host: Option<String>,

	/// Port to bind, overrides config
	#[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
	port: Option<u16>,

	/// Directory holding bundles and source maps, overrides config
	#[arg(long)]
	root: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", loom_devserver::version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let mut config = match &args.config {
		Some(path) => loom_devserver_config::load_config_with_file(path)?,
		None => loom_devserver_config::load_config()?,
	};
	if let Some(host) = args.host {
		config.http.host = host;
	}
	if let Some(port) = args.port {
		config.http.port = port;
	}
	if let Some(root) = args.root {
		config.artifacts.root_dir = root;
	}

	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	match config.logging.format {
		LogFormat::Json => tracing_subscriber::registry()
			.with(filter)
			.with(tracing_subscriber::fmt::layer().json())
			.init(),
		LogFormat::Pretty => tracing_subscriber::registry()
			.with(filter)
			.with(tracing_subscriber::fmt::layer())
			.init(),
	}

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		root = %config.artifacts.root_dir.display(),
		"starting loom-devserver"
	);

	let options = symbolicator_options(&config.symbolicator)?;
	let state = AppState::new(
		Arc::new(DirectoryArtifacts::new(&config.artifacts.root_dir)),
		Arc::new(TracingLogger),
		options,
	);

	let shell = build_shell(state).hook(Arc::new(ArtifactRootCheck::new(
		&config.artifacts.root_dir,
	)));

	let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
	shell.serve(listener, shutdown_signal()).await?;

	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %e, "failed to listen for shutdown signal");
		std::future::pending::<()>().await;
	}
	tracing::info!("received shutdown signal");
}
