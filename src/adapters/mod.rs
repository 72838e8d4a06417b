//! External system integrations for entity-feed.
//!
//! - [`database`] - Query executor trait, factory and paging queries
//! - [`postgresql`] - PostgreSQL executor (tokio-postgres + deadpool)
//! - [`mysql`] - MySQL executor (mysql_async)
//! - [`storage`] - Storage backends (S3, local directory) and the retrying uploader
//!
//! # Design Pattern
//!
//! Adapters isolate drivers and SDKs behind traits so the pipeline can be
//! exercised with in-memory implementations:
//!
//! ```rust,no_run
//! use entity_feed::adapters::database::{create_query_executor, page_query};
//! use entity_feed::config::load_config;
//! use entity_feed::domain::FeedType;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("entity-feed.toml")?;
//! let executor = create_query_executor(&config.database);
//! executor.connect(&config.database.connect_policy()).await?;
//!
//! let query = page_query(FeedType::Facility, executor.engine());
//! let rows = executor.execute(query, &[0, 100]).await?;
//! println!("{} rows", rows.len());
//!
//! executor.disconnect().await;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod mysql;
pub mod postgresql;
pub mod storage;
