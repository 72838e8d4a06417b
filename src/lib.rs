// entity-feed - Paginated database to gzip JSON feed generator
// Copyright (c) 2025 Entity Feed Contributors
// Licensed under the MIT License

//! # entity-feed - Paginated database to gzip JSON feed generator
//!
//! entity-feed reads entity rows from PostgreSQL or MySQL in fixed-size
//! chunks, reshapes each row into a nested feed entry, writes every chunk as a
//! gzip-compressed JSON artifact and uploads it to S3 or a local directory.
//! After the last chunk a `metadata.json` manifest listing every artifact is
//! written and uploaded.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Run orchestration, chunk reading, transformation, feed output, retry
//! - [`adapters`] - Database executors and storage backends
//! - [`domain`] - Records, feed descriptors and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use entity_feed::config::load_config;
//! use entity_feed::core::pipeline::PipelineOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("entity-feed.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let orchestrator = PipelineOrchestrator::from_config(&config, shutdown_rx).await?;
//!     let summary = orchestrator.run().await?;
//!
//!     println!("Wrote {} artifacts", summary.artifacts.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Output
//!
//! Each artifact is named `<feed_type>_feed_<timestamp_ms>.json.gz` and holds
//! `{"data": [...]}`. The manifest is plain JSON:
//!
//! ```json
//! {"generation_timestamp": 1700000000, "name": "reservewithgoogle.entity",
//!  "data_file": ["facility_feed_1700000000123.json.gz"]}
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::Result`]. Connection, query and transform
//! failures end the run; write and upload failures are recorded in the
//! [`core::pipeline::RunSummary`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
