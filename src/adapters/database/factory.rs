//! Query executor factory
//!
//! Creates the executor for the configured engine. The returned executor is
//! not connected yet; the pipeline calls `connect` with the configured policy.

use crate::adapters::database::traits::QueryExecutor;
use crate::adapters::mysql::MySqlExecutor;
use crate::adapters::postgresql::PostgresExecutor;
use crate::config::{DatabaseConfig, DatabaseEngine};
use std::sync::Arc;

/// Create a query executor based on the configuration
pub fn create_query_executor(config: &DatabaseConfig) -> Arc<dyn QueryExecutor> {
    match config.engine {
        DatabaseEngine::Postgres => {
            tracing::info!(source = %config.describe(), "Creating PostgreSQL executor");
            Arc::new(PostgresExecutor::new(config.clone()))
        }
        DatabaseEngine::Mysql => {
            tracing::info!(source = %config.describe(), "Creating MySQL executor");
            Arc::new(MySqlExecutor::new(config.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn config(engine: DatabaseEngine) -> DatabaseConfig {
        DatabaseConfig {
            engine,
            host: "localhost".to_string(),
            port: None,
            user: "feed".to_string(),
            password: secret_string("secret".to_string()),
            database: "places".to_string(),
            pool_min_size: 1,
            pool_max_size: 10,
            connect_retries: 3,
            connect_initial_delay_ms: 2000,
            connection_timeout_seconds: 30,
        }
    }

    #[test]
    fn test_factory_selects_engine() {
        let pg = create_query_executor(&config(DatabaseEngine::Postgres));
        assert_eq!(pg.engine(), DatabaseEngine::Postgres);

        let my = create_query_executor(&config(DatabaseEngine::Mysql));
        assert_eq!(my.engine(), DatabaseEngine::Mysql);
    }
}
