//! CLI interface for Seocore
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags for the `seocore` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Seocore website analysis engine
///
/// Plans an SEO analysis of a web address with an LLM, runs every step and
/// saves the aggregated SEO core as JSON.
#[derive(Parser, Debug)]
#[command(name = "seocore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP service
    Serve {
        /// Override the bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the bind port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Analyze one address in the foreground
    Run {
        /// Web address to analyze
        url: String,
    },

    /// Print the effective configuration
    Config,
}
