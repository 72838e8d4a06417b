//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIG_ERROR, EXIT_FATAL_ERROR, EXIT_SUCCESS};
use crate::domain::context::ResultExt;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "entity-feed.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing entity-feed configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG_ERROR);
        }

        match write_template(&self.output) {
            Ok(()) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Export DB_PASSWORD (or add it to a .env file)");
                println!("  3. Validate configuration: entity-feed validate-config");
                println!("  4. Generate the feed: entity-feed run");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL_ERROR)
            }
        }
    }
}

fn write_template(output: &str) -> crate::domain::Result<()> {
    fs::write(output, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write configuration file {output}"))
}

/// Sample configuration written by `init`
pub const CONFIG_TEMPLATE: &str = r#"# entity-feed configuration
#
# Values may reference environment variables as ${VAR}. Every key can also
# be overridden with ENTITY_FEED_<SECTION>_<KEY>, and the plain DB_*, S3_*,
# FEED_TYPE, FEED_NAME and CHUNK_SIZE variables are honoured as well.

[application]
# trace | debug | info | warn | error
log_level = "info"

[database]
# postgres | mysql
engine = "postgres"
host = "localhost"
# port defaults to 5432 for postgres and 3306 for mysql
# port = 5432
user = "feed"
password = "${DB_PASSWORD}"
database = "places"

pool_min_size = 1
pool_max_size = 10

# Attempts and first backoff delay; the delay doubles after each failure
connect_retries = 3
connect_initial_delay_ms = 2000
connection_timeout_seconds = 30

[feed]
feed_type = "facility"
name = "reservewithgoogle.entity"
# Rows per artifact (1-100000)
chunk_size = 100
# Artifacts and metadata.json are written here before upload
output_dir = "."

[storage]
# s3 | local
backend = "s3"
upload_retries = 3
upload_initial_delay_ms = 2000

[storage.s3]
bucket = "my-feed-bucket"
region = "us-east-1"
# Omit both keys to use the default AWS credential chain
# access_key_id = "${S3_ACCESS_KEY_ID}"
# secret_access_key = "${S3_SECRET_ACCESS_KEY}"
# endpoint = "http://localhost:9000"
# force_path_style = true
# key_prefix = "feeds/"

[storage.local]
directory = "local_storage"

[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "logs"
# daily | hourly | never
local_rotation = "daily"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config_str, DatabaseEngine, StorageBackendKind};
    use tempfile::TempDir;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "entity-feed.toml".to_string(),
            force: false,
        };

        assert_eq!(args.output, "entity-feed.toml");
        assert!(!args.force);
    }

    #[test]
    fn test_template_is_valid_config() {
        let _env = crate::config::loader::test_env::isolated();
        let toml = CONFIG_TEMPLATE.replace("${DB_PASSWORD}", "secret");
        let config = load_config_str(&toml).unwrap();

        assert_eq!(config.database.engine, DatabaseEngine::Postgres);
        assert_eq!(config.feed.chunk_size, 100);
        assert_eq!(config.storage.backend, StorageBackendKind::S3);
        assert_eq!(config.storage.local.directory, "local_storage");
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entity-feed.toml");
        std::fs::write(&path, "existing").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().into_owned(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_CONFIG_ERROR);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing");
    }

    #[tokio::test]
    async fn test_init_force_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entity-feed.toml");
        std::fs::write(&path, "existing").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().into_owned(),
            force: true,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_SUCCESS);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);
    }

    #[test]
    fn test_write_template_reports_path() {
        let err = write_template("/nonexistent/dir/entity-feed.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dir/entity-feed.toml"));
    }
}
