//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the entity-feed configuration file.

use super::{EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use crate::config::{load_config, FeedConfig, StorageBackendKind};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates after applying environment overrides
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        for line in summary_lines(&config) {
            println!("  {line}");
        }
        println!();

        Ok(EXIT_SUCCESS)
    }
}

/// Human readable overview; never includes secrets
fn summary_lines(config: &FeedConfig) -> Vec<String> {
    let mut lines = vec![
        format!("Log Level: {}", config.application.log_level),
        format!("Database: {}", config.database.describe()),
        format!(
            "Password: {}",
            if config.database.has_password() {
                "***"
            } else {
                "(none)"
            }
        ),
        format!(
            "Pool Size: {}..{}",
            config.database.pool_min_size, config.database.pool_max_size
        ),
        format!("Feed Type: {}", config.feed.feed_type),
        format!("Feed Name: {}", config.feed.name),
        format!("Chunk Size: {}", config.feed.chunk_size),
        format!("Output Directory: {}", config.feed.output_dir),
        format!("Storage Backend: {}", config.storage.backend),
        format!("Upload Retries: {}", config.storage.upload_retries),
    ];

    match config.storage.backend {
        StorageBackendKind::S3 => {
            if let Some(s3) = &config.storage.s3 {
                lines.push(format!("S3 Bucket: {}", s3.bucket));
                lines.push(format!("S3 Region: {}", s3.region));
                if let Some(endpoint) = &s3.endpoint {
                    lines.push(format!("S3 Endpoint: {endpoint}"));
                }
                lines.push(format!(
                    "S3 Credentials: {}",
                    if s3.access_key_id.is_some() {
                        "static"
                    } else {
                        "default chain"
                    }
                ));
            }
        }
        StorageBackendKind::Local => {
            lines.push(format!("Local Directory: {}", config.storage.local.directory));
        }
    }

    lines
}
