//! galaxy-importer CLI
//!
//! Main entry point: parses arguments, sets up logging and dispatches to a
//! command.

mod cli;
mod commands;
mod output;
mod source;
mod version;

use anyhow::{Context, Result};
use camino::Utf8Path;
use clap::Parser;
use galaxy_importer_core::{ConfigLoader, ImporterConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Must be installed before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    init_tracing(cli.verbose, cli.quiet, &config.log_level_main);

    match cli.command {
        Commands::Import(args) => commands::import::run(args, config).await,
        Commands::Readme(args) => commands::readme::run(args),
        Commands::Version(args) => commands::version::run(args),
    }
}

/// Explicit `--config` file, or the standard search locations
fn load_config(path: Option<&Utf8Path>) -> Result<ImporterConfig> {
    let loader = match path {
        Some(path) => {
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path);
            }
            ConfigLoader::with_file(path.as_std_path())
        }
        None => ConfigLoader::new(),
    };
    loader.load().context("Failed to load configuration")
}

/// Log to stderr so stdout carries only the result JSON
///
/// `default_level` is the configured `log_level_main`.
fn init_tracing(verbose: u8, quiet: bool, default_level: &str) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level_directive(default_level))),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Map config log level names onto tracing levels
fn level_directive(level: &str) -> String {
    match level.to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        other => other.to_string(),
    }
}
