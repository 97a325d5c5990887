// Seocore Engine
// Main entry point for the seocore binary

use clap::Parser;
use sdk::TaskStatus;
use seocore_engine::cli::{Cli, Command};
use seocore_engine::config::Config;
use seocore_engine::handlers::{handle_config, handle_run, handle_serve, OutputFormat};
use seocore_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let mut config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    if let Some(level) = cli.log {
        config.core.log_level = level;
        config.validate()?;
    }

    // Only takes effect if RUST_LOG env var is not set
    init_telemetry_with_level(&config.core.log_level);
    tracing::info!("Seocore Engine v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            handle_serve(&config).await
        }

        Command::Run { url } => {
            let status = handle_run(&url, &config, format).await?;
            if status == TaskStatus::Error {
                std::process::exit(1);
            }
            Ok(())
        }

        Command::Config => handle_config(&config, format),
    }
}
