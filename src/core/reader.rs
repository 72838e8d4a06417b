//! Offset/limit chunk reader

use crate::adapters::database::{page_query, QueryExecutor, QueryParam};
use crate::domain::{FeedType, QueryError, RawRecord};
use std::sync::Arc;

/// Reads one page of source rows per call
///
/// An empty page means the source is exhausted.
#[derive(Clone)]
pub struct ChunkReader {
    executor: Arc<dyn QueryExecutor>,
    query: &'static str,
}

impl ChunkReader {
    /// Reader using the page query for `feed_type` on the executor's engine
    pub fn new(executor: Arc<dyn QueryExecutor>, feed_type: FeedType) -> Self {
        let query = page_query(feed_type, executor.engine());
        Self { executor, query }
    }

    pub fn executor(&self) -> &Arc<dyn QueryExecutor> {
        &self.executor
    }

    /// Skip `offset` rows and return up to `size` rows ordered by id
    pub async fn fetch_chunk(&self, offset: u64, size: usize) -> Result<Vec<RawRecord>, QueryError> {
        let params: [QueryParam; 2] = [to_param(offset)?, to_param(size as u64)?];

        tracing::debug!(offset, size, "Fetching chunk");
        let rows = self.executor.execute(self.query, &params).await?;
        tracing::debug!(offset, rows = rows.len(), "Chunk fetched");

        Ok(rows)
    }
}

fn to_param(value: u64) -> Result<QueryParam, QueryError> {
    QueryParam::try_from(value)
        .map_err(|_| QueryError::Execution(format!("Paging parameter {value} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseEngine;
    use crate::core::retry::RetryPolicy;
    use crate::domain::ConnectionError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<(String, Vec<QueryParam>)>>,
    }

    #[async_trait]
    impl QueryExecutor for RecordingExecutor {
        fn engine(&self) -> DatabaseEngine {
            DatabaseEngine::Mysql
        }

        async fn connect(&self, _policy: &RetryPolicy) -> Result<(), ConnectionError> {
            Ok(())
        }

        async fn execute(
            &self,
            query: &str,
            params: &[QueryParam],
        ) -> Result<Vec<RawRecord>, QueryError> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), params.to_vec()));
            Ok(vec![RawRecord::new().with("id", 1)])
        }

        async fn disconnect(&self) {}
    }

    #[tokio::test]
    async fn test_fetch_chunk_passes_offset_then_limit() {
        let executor = Arc::new(RecordingExecutor::default());
        let reader = ChunkReader::new(executor.clone(), FeedType::Facility);

        let rows = reader.fetch_chunk(200, 100).await.unwrap();
        assert_eq!(rows.len(), 1);

        let calls = executor.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, vec![200, 100]);
        assert_eq!(
            calls[0].0,
            page_query(FeedType::Facility, DatabaseEngine::Mysql)
        );
    }

    #[tokio::test]
    async fn test_fetch_chunk_rejects_out_of_range_offset() {
        let reader = ChunkReader::new(Arc::new(RecordingExecutor::default()), FeedType::Facility);

        let err = reader.fetch_chunk(u64::MAX, 10).await.unwrap_err();
        assert!(matches!(err, QueryError::Execution(_)));
    }
}
