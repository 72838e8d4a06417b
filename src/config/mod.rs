//! Configuration management for entity-feed.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! entity-feed uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Environment overrides (`ENTITY_FEED_<SECTION>_<KEY>`, `DB_*`, `S3_*`)
//! - Default values for optional settings
//! - Validation of every selector and bound before a run starts
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use entity_feed::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("entity-feed.toml")?;
//!
//! println!("Source: {}", config.database.describe());
//! println!("Chunk size: {}", config.feed.chunk_size);
//! println!("Backend: {}", config.storage.backend);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`DatabaseConfig`] - Engine, connection, pool and connect retries
//! - [`FeedSettings`] - Feed type, feed name, chunk size, output directory
//! - [`StorageConfig`] - Backend selection, upload retries, S3 / local settings
//! - [`LoggingConfig`] - Optional JSON file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [database]
//! engine = "postgres"
//! host = "localhost"
//! user = "feed"
//! password = "${DB_PASSWORD}"
//! database = "places"
//!
//! [feed]
//! feed_type = "facility"
//! chunk_size = 100
//!
//! [storage]
//! backend = "s3"
//!
//! [storage.s3]
//! bucket = "partner-feeds"
//! region = "us-east-1"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_str};
pub use schema::{
    ApplicationConfig, DatabaseConfig, DatabaseEngine, FeedConfig, FeedSettings,
    LocalStorageConfig, LoggingConfig, S3Config, StorageBackendKind, StorageConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
