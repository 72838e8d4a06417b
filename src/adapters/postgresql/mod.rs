//! PostgreSQL source integration
//!
//! Pooled tokio-postgres connections behind the
//! [`QueryExecutor`](crate::adapters::database::QueryExecutor) trait.

pub mod client;
pub mod row;

pub use client::PostgresExecutor;
