//! MySQL query executor
//!
//! Pooled mysql_async connections. Values arrive in the text or binary
//! protocol as `mysql_async::Value` and are mapped to JSON scalars; byte
//! strings are decoded as UTF-8 since the source columns are character data.

use crate::adapters::database::traits::{QueryExecutor, QueryParam};
use crate::config::{DatabaseConfig, DatabaseEngine};
use crate::core::retry::{retry_with_backoff, RetryPolicy};
use crate::domain::{ConnectionError, QueryError, RawRecord};
use async_trait::async_trait;
use futures::future::try_join_all;
use mysql_async::prelude::Queryable;
use mysql_async::{OptsBuilder, Pool, PoolConstraints, PoolOpts, Row};
use secrecy::ExposeSecret;
use serde_json::Value;
use tokio::sync::RwLock;

/// MySQL implementation of [`QueryExecutor`]
pub struct MySqlExecutor {
    config: DatabaseConfig,
    pool: RwLock<Option<Pool>>,
}

impl MySqlExecutor {
    /// Create an unconnected executor
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            pool: RwLock::new(None),
        }
    }

    fn opts(&self) -> Result<OptsBuilder, ConnectionError> {
        let constraints =
            PoolConstraints::new(self.config.pool_min_size, self.config.pool_max_size)
                .ok_or_else(|| {
                    ConnectionError::InvalidSettings(format!(
                        "Invalid pool bounds {}..{}",
                        self.config.pool_min_size, self.config.pool_max_size
                    ))
                })?;

        let password = self.config.password.expose_secret();
        let password = (!password.is_empty()).then(|| password.as_str().to_string());

        Ok(OptsBuilder::default()
            .ip_or_hostname(self.config.host.clone())
            .tcp_port(self.config.effective_port())
            .user(Some(self.config.user.clone()))
            .pass(password)
            .db_name(Some(self.config.database.clone()))
            .pool_opts(PoolOpts::default().with_constraints(constraints)))
    }

    async fn build_pool(&self, opts: OptsBuilder) -> Result<Pool, String> {
        let pool = Pool::new(opts);
        let timeout = self.config.connection_timeout();

        let warm = tokio::time::timeout(
            timeout,
            try_join_all((0..self.config.pool_min_size).map(|_| pool.get_conn())),
        )
        .await
        .map_err(|_| format!("Timed out after {}s", timeout.as_secs()))
        .and_then(|res| res.map_err(|e| e.to_string()));

        let mut warm = match warm {
            Ok(conns) => conns,
            Err(e) => {
                let _ = pool.disconnect().await;
                return Err(e);
            }
        };

        let ping = match warm.first_mut() {
            Some(conn) => conn
                .ping()
                .await
                .map_err(|e| format!("Connection test failed: {e}")),
            None => Ok(()),
        };

        // disconnect waits for every checked-out connection
        drop(warm);
        if let Err(e) = ping {
            let _ = pool.disconnect().await;
            return Err(e);
        }

        Ok(pool)
    }

    async fn current_pool(&self) -> Result<Pool, QueryError> {
        self.pool.read().await.clone().ok_or(QueryError::NotConnected)
    }
}

#[async_trait]
impl QueryExecutor for MySqlExecutor {
    fn engine(&self) -> DatabaseEngine {
        DatabaseEngine::Mysql
    }

    async fn connect(&self, policy: &RetryPolicy) -> Result<(), ConnectionError> {
        if self.pool.read().await.is_some() {
            return Ok(());
        }

        let target = self.config.describe();
        let opts = self.opts()?;

        let pool = retry_with_backoff(
            policy,
            "mysql_connect",
            &target,
            |_| true,
            |attempt| {
                let opts = opts.clone();
                let source = target.as_str();
                async move {
                    tracing::debug!(attempt, source, "Creating MySQL connection pool");
                    self.build_pool(opts).await
                }
            },
        )
        .await
        .map_err(|failure| ConnectionError::Exhausted {
            engine: DatabaseEngine::Mysql.to_string(),
            attempts: failure.attempts,
            message: failure.last_error,
        })?;

        *self.pool.write().await = Some(pool);

        tracing::info!(
            source = %target,
            min_size = self.config.pool_min_size,
            max_size = self.config.pool_max_size,
            "MySQL connection pool created"
        );
        Ok(())
    }

    async fn execute(
        &self,
        query: &str,
        params: &[QueryParam],
    ) -> Result<Vec<RawRecord>, QueryError> {
        let pool = self.current_pool().await?;
        let mut conn = pool
            .get_conn()
            .await
            .map_err(|e| QueryError::Pool(e.to_string()))?;

        let params: Vec<mysql_async::Value> =
            params.iter().map(|p| mysql_async::Value::from(*p)).collect();

        let rows: Vec<Row> = conn
            .exec(query, params)
            .await
            .map_err(|e| QueryError::Execution(e.to_string()))?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }

    async fn disconnect(&self) {
        if let Some(pool) = self.pool.write().await.take() {
            match pool.disconnect().await {
                Ok(()) => tracing::info!("MySQL connection pool closed"),
                Err(e) => tracing::warn!(error = %e, "Error while closing MySQL connection pool"),
            }
        }
    }
}

fn row_to_record(row: Row) -> RawRecord {
    row.columns_ref()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let value: mysql_async::Value = row.get(i).unwrap_or(mysql_async::Value::NULL);
            (column.name_str().to_string(), mysql_value_to_json(value))
        })
        .collect()
}

fn mysql_value_to_json(value: mysql_async::Value) -> Value {
    match value {
        mysql_async::Value::NULL => Value::Null,
        mysql_async::Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(s) => Value::String(s),
            Err(e) => Value::String(String::from_utf8_lossy(e.as_bytes()).into_owned()),
        },
        mysql_async::Value::Int(n) => Value::from(n),
        mysql_async::Value::UInt(n) => Value::from(n),
        mysql_async::Value::Float(f) => float(f64::from(f)),
        mysql_async::Value::Double(d) => float(d),
        mysql_async::Value::Date(year, month, day, 0, 0, 0, 0) => {
            Value::String(format!("{year:04}-{month:02}-{day:02}"))
        }
        mysql_async::Value::Date(year, month, day, hour, min, sec, micro) => Value::String(
            format!("{year:04}-{month:02}-{day:02}T{hour:02}:{min:02}:{sec:02}.{micro:06}"),
        ),
        mysql_async::Value::Time(negative, days, hours, min, sec, micro) => {
            let sign = if negative { "-" } else { "" };
            let hours = u32::from(hours) + days * 24;
            Value::String(format!("{sign}{hours:02}:{min:02}:{sec:02}.{micro:06}"))
        }
    }
}

fn float(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use serde_json::json;

    fn config() -> DatabaseConfig {
        DatabaseConfig {
            engine: DatabaseEngine::Mysql,
            host: "127.0.0.1".to_string(),
            port: None,
            user: "feed".to_string(),
            password: secret_string("secret".to_string()),
            database: "facilities".to_string(),
            pool_min_size: 1,
            pool_max_size: 4,
            connect_retries: 3,
            connect_initial_delay_ms: 10,
            connection_timeout_seconds: 1,
        }
    }

    #[test]
    fn test_value_conversion_scalars() {
        assert_eq!(mysql_value_to_json(mysql_async::Value::NULL), Value::Null);
        assert_eq!(
            mysql_value_to_json(mysql_async::Value::Bytes(b"Main St".to_vec())),
            json!("Main St")
        );
        assert_eq!(mysql_value_to_json(mysql_async::Value::Int(-7)), json!(-7));
        assert_eq!(mysql_value_to_json(mysql_async::Value::UInt(42)), json!(42));
        assert_eq!(
            mysql_value_to_json(mysql_async::Value::Double(37.422)),
            json!(37.422)
        );
        assert_eq!(
            mysql_value_to_json(mysql_async::Value::Double(f64::NAN)),
            Value::Null
        );
    }

    #[test]
    fn test_value_conversion_dates() {
        assert_eq!(
            mysql_value_to_json(mysql_async::Value::Date(2024, 3, 9, 0, 0, 0, 0)),
            json!("2024-03-09")
        );
        assert_eq!(
            mysql_value_to_json(mysql_async::Value::Date(2024, 3, 9, 14, 5, 1, 250)),
            json!("2024-03-09T14:05:01.000250")
        );
        assert_eq!(
            mysql_value_to_json(mysql_async::Value::Time(true, 1, 2, 3, 4, 0)),
            json!("-26:03:04.000000")
        );
    }

    #[test]
    fn test_opts_rejects_inverted_pool_bounds() {
        let mut config = config();
        config.pool_min_size = 5;
        config.pool_max_size = 2;
        assert!(matches!(
            MySqlExecutor::new(config).opts(),
            Err(ConnectionError::InvalidSettings(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_settings_are_not_retried() {
        let mut config = config();
        config.pool_min_size = 5;
        config.pool_max_size = 2;
        let executor = MySqlExecutor::new(config);
        let start = tokio::time::Instant::now();

        let err = executor
            .connect(&RetryPolicy::new(3, std::time::Duration::from_secs(30)))
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectionError::InvalidSettings(_)));
        assert_eq!(start.elapsed(), std::time::Duration::ZERO);
        assert!(executor.pool.read().await.is_none());
    }

    #[tokio::test]
    async fn test_execute_before_connect_fails() {
        let executor = MySqlExecutor::new(config());
        assert_eq!(executor.engine(), DatabaseEngine::Mysql);
        assert!(matches!(
            executor.execute("SELECT 1", &[]).await,
            Err(QueryError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_connect_exhausts_retries_on_unreachable_server() {
        // Port 1 is never a MySQL server
        let mut config = config();
        config.port = Some(1);
        let executor = MySqlExecutor::new(config);

        let err = executor
            .connect(&RetryPolicy::new(2, std::time::Duration::from_millis(1)))
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectionError::Exhausted { attempts: 2, .. }));
        assert!(executor.pool.read().await.is_none());
    }
}
