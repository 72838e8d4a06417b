//! Core business logic for entity-feed.
//!
//! # Modules
//!
//! - [`pipeline`] - Run orchestration and the run summary
//! - [`reader`] - Offset/limit chunk reading
//! - [`transform`] - Source row to feed entry transformation
//! - [`feed`] - Gzip artifact and manifest writers
//! - [`retry`] - Retry with exponential backoff
//!
//! # Run Workflow
//!
//! 1. **Connect**: open the source pool, retrying with backoff
//! 2. **Fetch**: read the next chunk ordered by id
//! 3. **Transform**: map each row to a feed entry
//! 4. **Write**: gzip the chunk into a timestamped artifact
//! 5. **Upload**: send the artifact to storage and delete the local copy
//! 6. **Manifest**: after the last chunk, write and upload `metadata.json`
//!
//! # Example
//!
//! ```rust,no_run
//! use entity_feed::config::load_config;
//! use entity_feed::core::pipeline::PipelineOrchestrator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("entity-feed.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let orchestrator = PipelineOrchestrator::from_config(&config, shutdown_rx).await?;
//! let summary = orchestrator.run().await?;
//!
//! println!("Artifacts: {}", summary.artifacts.len());
//! println!("Failed uploads: {}", summary.failed_uploads.len());
//! # Ok(())
//! # }
//! ```

pub mod feed;
pub mod pipeline;
pub mod reader;
pub mod retry;
pub mod transform;
