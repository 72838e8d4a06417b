//! Run command implementation
//!
//! This module implements the `run` command: one complete feed generation
//! run from the configured database to the configured storage backend.

use super::{
    EXIT_CONFIG_ERROR, EXIT_CONNECTION_ERROR, EXIT_FATAL_ERROR, EXIT_INTERRUPTED, EXIT_SUCCESS,
};
use crate::config::{load_config, FeedConfig, StorageBackendKind};
use crate::core::pipeline::{PipelineOrchestrator, RunSummary};
use crate::domain::{ConnectionError, FeedError};
use clap::Args;
use std::str::FromStr;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Override the number of rows per chunk
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Override the feed name written to the manifest
    #[arg(long)]
    pub feed_name: Option<String>,

    /// Override the storage backend (s3 or local)
    #[arg(long, value_name = "BACKEND")]
    pub storage_backend: Option<String>,

    /// Override the directory artifacts are written to before upload
    #[arg(long)]
    pub output_dir: Option<String>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("{e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        if let Err(e) = self.apply_overrides(&mut config) {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG_ERROR);
        }

        tracing::info!(source = %config.database.describe(), "Source database");

        let orchestrator = match PipelineOrchestrator::from_config(&config, shutdown_signal).await {
            Ok(o) => o,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize pipeline");
                eprintln!("Failed to initialize run: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("🚀 Generating {} feed...", config.feed.feed_type);
        println!();

        let summary = match orchestrator.run().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Run failed");
                eprintln!("Run failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        print_summary(&summary);

        let exit_code = if summary.interrupted {
            println!("⚠️  Run interrupted. No manifest was published.");
            tracing::info!("Run interrupted by user signal");
            EXIT_INTERRUPTED
        } else if summary.is_successful() {
            println!("✅ Feed generated successfully!");
            EXIT_SUCCESS
        } else {
            println!("⚠️  Feed generated with errors");
            EXIT_SUCCESS
        };

        Ok(exit_code)
    }

    /// Apply command-line overrides and re-validate
    fn apply_overrides(&self, config: &mut FeedConfig) -> Result<(), String> {
        if let Some(size) = self.chunk_size {
            tracing::info!(chunk_size = size, "Overriding chunk size from CLI");
            config.feed.chunk_size = size;
        }

        if let Some(name) = &self.feed_name {
            tracing::info!(feed_name = %name, "Overriding feed name from CLI");
            config.feed.name = name.clone();
        }

        if let Some(backend) = &self.storage_backend {
            let kind = StorageBackendKind::from_str(backend).map_err(|e| e.to_string())?;
            tracing::info!(backend = %kind, "Overriding storage backend from CLI");
            config.storage.backend = kind;
        }

        if let Some(dir) = &self.output_dir {
            tracing::info!(output_dir = %dir, "Overriding output directory from CLI");
            config.feed.output_dir = dir.clone();
        }

        config.validate()
    }
}

/// Map a fatal run error to the process exit code
pub fn exit_code_for(error: &FeedError) -> i32 {
    match error {
        FeedError::Configuration(_)
        | FeedError::Connection(ConnectionError::InvalidSettings(_)) => EXIT_CONFIG_ERROR,
        FeedError::Connection(_) => EXIT_CONNECTION_ERROR,
        _ => EXIT_FATAL_ERROR,
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("📊 Run Summary:");
    println!("  Chunks: {}", summary.chunks_fetched);
    println!("  Rows: {}", summary.rows_fetched);
    println!("  Artifacts: {}", summary.artifacts.len());
    println!("  Uploaded: {}", summary.uploaded);
    println!("  Failed Uploads: {}", summary.failed_uploads.len());
    match &summary.manifest {
        Some(path) => println!(
            "  Manifest: {} ({})",
            path.display(),
            if summary.manifest_uploaded {
                "uploaded"
            } else {
                "not uploaded"
            }
        ),
        None => println!("  Manifest: not written"),
    }
    println!("  Final Offset: {}", summary.final_offset);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if !summary.failed_uploads.is_empty() {
        println!("⚠️  Listed in the manifest but not uploaded:");
        for file in &summary.failed_uploads {
            println!("  - {file}");
        }
        println!();
    }

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in &summary.errors {
            println!("  - {}: {}", error.stage.as_str(), error.message);
            if let Some(context) = &error.context {
                println!("    Context: {context}");
            }
        }
        println!();
    }
}
