//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - serve: Run the HTTP service until Ctrl-C
//! - run: Analyze one address in the foreground
//! - config: Print the effective configuration

use anyhow::{Context, Result};
use sdk::{TaskSnapshot, TaskStatus};
use serde_json::json;
use std::sync::Arc;

use crate::artifacts::FsArtifactStore;
use crate::conductor::Orchestrator;
use crate::config::Config;
use crate::fetcher::HttpContentFetcher;
use crate::llm::openai::OpenAIClient;
use crate::registry::InMemoryTaskStore;
use crate::secrets::api_key_from_env;
use crate::server::{self, AppState};
use crate::supervisor::Supervisor;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Wire the production components together
///
/// Fails when the API key is not present in the environment.
pub fn build_supervisor(config: &Config) -> Result<Arc<Supervisor>> {
    let api_key = api_key_from_env(&config.llm.api_key_env)?;

    let llm = OpenAIClient::from_config(&config.llm, api_key)
        .context("Failed to build the completion client")?;
    let fetcher = HttpContentFetcher::new(config.fetch.timeout());
    let artifacts = FsArtifactStore::new(&config.core.results_dir);
    let store = InMemoryTaskStore::new();

    tracing::info!(
        "Using model {} at {}, artifacts in {:?}",
        config.llm.model,
        config.llm.base_url,
        config.core.results_dir
    );

    let orchestrator = Orchestrator::new(
        Arc::new(store),
        Arc::new(llm),
        Arc::new(fetcher),
        Arc::new(artifacts),
        &config.llm.model,
    );

    Ok(Arc::new(Supervisor::new(Arc::new(orchestrator))))
}

/// Start the HTTP service
pub async fn handle_serve(config: &Config) -> Result<()> {
    let supervisor = build_supervisor(config)?;
    server::serve(config, AppState::new(supervisor)).await?;
    Ok(())
}

/// Run one analysis to completion and print its log and result
///
/// Returns the terminal status so the caller can pick an exit code.
pub async fn handle_run(url: &str, config: &Config, format: OutputFormat) -> Result<TaskStatus> {
    let supervisor = build_supervisor(config)?;

    if let OutputFormat::Text = format {
        println!("Analyzing: {}", url);
        println!();
    }

    let task_id = supervisor.submit(url)?;
    supervisor.join(&task_id).await;

    let task = supervisor
        .store()
        .get(&task_id)
        .context("Task vanished from the registry")?;

    match format {
        OutputFormat::Text => print_task(&task)?,
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&task)?),
    }

    Ok(task.status)
}

fn print_task(task: &TaskSnapshot) -> Result<()> {
    for line in &task.log {
        println!("{}", line);
    }
    println!();

    match task.status {
        TaskStatus::Done => println!("✓ Task {} completed", task.id),
        _ => println!("✗ Task {} ended with status {}", task.id, task.status),
    }

    if let Some(result) = &task.result {
        println!("Result:");
        println!("{}", serde_json::to_string_pretty(result)?);
    }
    Ok(())
}

/// Print the effective configuration
///
/// Only the name of the API key variable is part of the config, never the
/// key itself.
pub fn handle_config(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let rendered =
                toml::to_string_pretty(config).context("Failed to serialize configuration")?;
            print!("{}", rendered);
        }
        OutputFormat::Json => {
            let output = json!({
                "config": config,
                "api_key_present": api_key_from_env(&config.llm.api_key_env).is_ok(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
