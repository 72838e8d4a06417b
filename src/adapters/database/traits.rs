//! Query executor abstraction
//!
//! The pipeline reads its source rows through [`QueryExecutor`] and never sees
//! a driver type. Each engine adapter owns its connection pool and converts
//! driver rows into [`RawRecord`]s.

use crate::config::DatabaseEngine;
use crate::core::retry::RetryPolicy;
use crate::domain::{ConnectionError, QueryError, RawRecord};
use async_trait::async_trait;

/// Positional query parameter
///
/// Only integers are needed by the paging queries.
pub type QueryParam = i64;

/// Executes parameterized queries against a relational source
///
/// Lifecycle: `connect` once, any number of `execute` calls, `disconnect`
/// once. `execute` before a successful `connect` (or after `disconnect`)
/// fails with [`QueryError::NotConnected`].
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Engine this executor talks to
    fn engine(&self) -> DatabaseEngine;

    /// Establish the connection pool
    ///
    /// Retries with exponential backoff according to `policy`. Calling
    /// `connect` on a connected executor is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Exhausted`] carrying the last driver error
    /// once every attempt has failed.
    async fn connect(&self, policy: &RetryPolicy) -> Result<(), ConnectionError>;

    /// Run `query` with positional `params` and return the rows in result order
    ///
    /// Query failures are not retried.
    async fn execute(
        &self,
        query: &str,
        params: &[QueryParam],
    ) -> Result<Vec<RawRecord>, QueryError>;

    /// Close the pool; a no-op when not connected
    async fn disconnect(&self);
}
