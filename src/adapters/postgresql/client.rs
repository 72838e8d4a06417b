//! PostgreSQL query executor
//!
//! Connection pooling via deadpool-postgres. The pool is created lazily by
//! [`QueryExecutor::connect`] and shared by every subsequent query.

use crate::adapters::database::traits::{QueryExecutor, QueryParam};
use crate::adapters::postgresql::row::row_to_record;
use crate::config::{DatabaseConfig, DatabaseEngine};
use crate::core::retry::{retry_with_backoff, RetryPolicy};
use crate::domain::{ConnectionError, QueryError, RawRecord};
use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use futures::future::try_join_all;
use secrecy::ExposeSecret;
use tokio::sync::RwLock;
use tokio_postgres::types::ToSql;
use tokio_postgres::NoTls;

/// PostgreSQL implementation of [`QueryExecutor`]
pub struct PostgresExecutor {
    config: DatabaseConfig,
    pool: RwLock<Option<Pool>>,
}

impl PostgresExecutor {
    /// Create an unconnected executor
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: RwLock::new(None),
        }
    }

    fn pg_config(&self) -> tokio_postgres::Config {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&self.config.host)
            .port(self.config.effective_port())
            .user(&self.config.user)
            .dbname(&self.config.database)
            .connect_timeout(self.config.connection_timeout())
            .application_name("entity-feed");

        let password = self.config.password.expose_secret();
        if !password.is_empty() {
            pg_config.password(password.as_str());
        }

        pg_config
    }

    /// Build the pool without opening any connection
    fn build_pool(&self) -> Result<Pool, ConnectionError> {
        let manager = Manager::from_config(
            self.pg_config(),
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let timeout = self.config.connection_timeout();
        Pool::builder(manager)
            .max_size(self.config.pool_max_size)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| {
                ConnectionError::InvalidSettings(format!("Failed to create connection pool: {e}"))
            })
    }

    /// Open `pool_min_size` connections and verify one of them
    ///
    /// deadpool opens connections on demand, so the minimum is reached by
    /// checking out that many objects at once.
    async fn warm_up(&self, pool: &Pool) -> Result<(), String> {
        let warm = try_join_all((0..self.config.pool_min_size).map(|_| pool.get()))
            .await
            .map_err(|e| e.to_string())?;

        if let Some(client) = warm.first() {
            client
                .query_one("SELECT 1", &[])
                .await
                .map_err(|e| format!("Connection test failed: {e}"))?;
        }

        Ok(())
    }

    async fn current_pool(&self) -> Result<Pool, QueryError> {
        self.pool.read().await.clone().ok_or(QueryError::NotConnected)
    }
}

#[async_trait]
impl QueryExecutor for PostgresExecutor {
    fn engine(&self) -> DatabaseEngine {
        DatabaseEngine::Postgres
    }

    async fn connect(&self, policy: &RetryPolicy) -> Result<(), ConnectionError> {
        if self.pool.read().await.is_some() {
            return Ok(());
        }

        let target = self.config.describe();
        let pool = self.build_pool()?;

        let warmed = retry_with_backoff(
            policy,
            "postgres_connect",
            &target,
            |_| true,
            |attempt| {
                let pool = &pool;
                let source = target.as_str();
                async move {
                    tracing::debug!(attempt, source, "Opening PostgreSQL connections");
                    self.warm_up(pool).await
                }
            },
        )
        .await;

        if let Err(failure) = warmed {
            pool.close();
            return Err(ConnectionError::Exhausted {
                engine: DatabaseEngine::Postgres.to_string(),
                attempts: failure.attempts,
                message: failure.last_error,
            });
        }

        *self.pool.write().await = Some(pool);

        tracing::info!(
            source = %target,
            min_size = self.config.pool_min_size,
            max_size = self.config.pool_max_size,
            "PostgreSQL connection pool created"
        );
        Ok(())
    }

    async fn execute(
        &self,
        query: &str,
        params: &[QueryParam],
    ) -> Result<Vec<RawRecord>, QueryError> {
        let pool = self.current_pool().await?;
        let client = pool
            .get()
            .await
            .map_err(|e| QueryError::Pool(e.to_string()))?;

        let params: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let rows = client
            .query(query, &params)
            .await
            .map_err(|e| QueryError::Execution(e.to_string()))?;

        rows.iter().map(row_to_record).collect()
    }

    async fn disconnect(&self) {
        if let Some(pool) = self.pool.write().await.take() {
            pool.close();
            tracing::info!("PostgreSQL connection pool closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use std::time::Duration;

    fn config(port: u16) -> DatabaseConfig {
        DatabaseConfig {
            engine: DatabaseEngine::Postgres,
            host: "127.0.0.1".to_string(),
            port: Some(port),
            user: "feed".to_string(),
            password: secret_string("secret".to_string()),
            database: "facilities".to_string(),
            pool_min_size: 1,
            pool_max_size: 2,
            connect_retries: 2,
            connect_initial_delay_ms: 10,
            connection_timeout_seconds: 1,
        }
    }

    #[tokio::test]
    async fn test_execute_before_connect_fails() {
        let executor = PostgresExecutor::new(config(5432));
        let result = executor.execute("SELECT 1", &[]).await;
        assert!(matches!(result, Err(QueryError::NotConnected)));
    }

    #[tokio::test]
    async fn test_disconnect_without_pool_is_noop() {
        let executor = PostgresExecutor::new(config(5432));
        executor.disconnect().await;
        assert!(executor.pool.read().await.is_none());
    }

    #[tokio::test]
    async fn test_connect_exhausts_retries_on_unreachable_server() {
        // Port 1 is never a PostgreSQL server
        let executor = PostgresExecutor::new(config(1));
        let policy = RetryPolicy::new(2, Duration::from_millis(10));

        let err = executor.connect(&policy).await.unwrap_err();
        match err {
            ConnectionError::Exhausted {
                engine, attempts, ..
            } => {
                assert_eq!(engine, "postgres");
                assert_eq!(attempts, 2);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(matches!(
            executor.execute("SELECT 1", &[]).await,
            Err(QueryError::NotConnected)
        ));
    }
}
