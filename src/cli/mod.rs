//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for entity-feed using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// entity-feed - Paginated database to gzip JSON feed generator
#[derive(Parser, Debug)]
#[command(name = "entity-feed")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "entity-feed.toml", env = "ENTITY_FEED_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ENTITY_FEED_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the feed and upload artifacts and manifest
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
