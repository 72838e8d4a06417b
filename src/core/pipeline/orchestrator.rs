//! Pipeline orchestrator - drives one feed generation run
//!
//! The run is strictly sequential: fetch a chunk, transform it, write the
//! artifact, upload it, advance the offset. An empty chunk ends the loop and
//! the manifest listing every artifact is written and uploaded last.
//!
//! Failure handling per stage:
//! - connection exhausted, query or transform failure: fatal, returned as `Err`
//! - artifact write failure: ends the loop, the manifest is still produced
//! - upload failure: recorded and the loop continues; the artifact stays in
//!   the manifest
//! - shutdown signal: an in-flight connect, query or upload (including its
//!   backoff sleeps) is abandoned, otherwise the loop stops at the next stage
//!   boundary; no manifest is written

use crate::adapters::database::{create_query_executor, QueryExecutor};
use crate::adapters::storage::traits::file_name;
use crate::adapters::storage::{create_storage_backend, StorageBackend, Uploader};
use crate::config::FeedConfig;
use crate::core::feed::{FeedWriter, ManifestWriter};
use crate::core::pipeline::summary::{RunError, RunStage, RunSummary};
use crate::core::reader::ChunkReader;
use crate::core::retry::RetryPolicy;
use crate::core::transform::{create_transformer, RecordTransformer};
use crate::domain::feed::{GZIP_ENCODING, IDENTITY_ENCODING, JSON_CONTENT_TYPE};
use crate::domain::{FeedError, FeedType, Result, UploadError, WriteError};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Run parameters resolved from configuration
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub feed_type: FeedType,
    pub feed_name: String,
    pub chunk_size: usize,
    pub output_dir: PathBuf,
    pub connect_policy: RetryPolicy,
    pub upload_policy: RetryPolicy,
}

impl PipelineSettings {
    /// Resolve settings from a validated configuration
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        Ok(Self {
            feed_type: config.feed.feed_type()?,
            feed_name: config.feed.name.clone(),
            chunk_size: config.feed.chunk_size,
            output_dir: config.feed.output_path(),
            connect_policy: config.database.connect_policy(),
            upload_policy: config.storage.upload_policy(),
        })
    }
}

/// Pipeline orchestrator
pub struct PipelineOrchestrator {
    reader: ChunkReader,
    transformer: Box<dyn RecordTransformer>,
    writer: FeedWriter,
    manifest_writer: ManifestWriter,
    uploader: Uploader,
    settings: PipelineSettings,
    shutdown_signal: watch::Receiver<bool>,
}

impl PipelineOrchestrator {
    /// Assemble an orchestrator from its two external collaborators
    pub fn new(
        executor: Arc<dyn QueryExecutor>,
        backend: Arc<dyn StorageBackend>,
        settings: PipelineSettings,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            reader: ChunkReader::new(executor, settings.feed_type),
            transformer: create_transformer(settings.feed_type),
            writer: FeedWriter::new(&settings.output_dir, settings.feed_type),
            manifest_writer: ManifestWriter::new(&settings.output_dir),
            uploader: Uploader::new(backend, settings.upload_policy),
            settings,
            shutdown_signal,
        }
    }

    /// Build the executor and storage backend named by `config`
    ///
    /// Nothing is connected yet; the database connection is opened by
    /// [`run`](Self::run).
    pub async fn from_config(
        config: &FeedConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Result<Self> {
        let settings = PipelineSettings::from_config(config)?;
        let executor = create_query_executor(&config.database);
        let backend = create_storage_backend(&config.storage).await?;

        Ok(Self::new(executor, backend, settings, shutdown_signal))
    }

    /// Write artifacts with `writer` instead of one rooted at the output dir
    pub fn with_feed_writer(mut self, writer: FeedWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Execute one run
    ///
    /// The connection is closed on every path out of this function.
    ///
    /// # Errors
    ///
    /// Returns the fatal error when connection retries are exhausted, a chunk
    /// query fails, or a row cannot be transformed. Write and upload failures
    /// are reported in the returned [`RunSummary`] instead.
    pub async fn run(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        let mut summary = RunSummary::new();
        let executor = self.reader.executor();

        tracing::info!(
            feed_type = %self.settings.feed_type,
            feed_name = %self.settings.feed_name,
            chunk_size = self.settings.chunk_size,
            output_dir = %self.settings.output_dir.display(),
            backend = self.uploader.backend_name(),
            "Starting feed run"
        );

        match self
            .until_shutdown(executor.connect(&self.settings.connect_policy))
            .await
        {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                executor.disconnect().await;
                return Err(FeedError::Connection(e));
            }
            None => {
                self.check_shutdown(&mut summary);
                executor.disconnect().await;
                let summary = summary.with_duration(start_time.elapsed());
                summary.log_summary();
                return Ok(summary);
            }
        }

        let outcome = self.generate(&mut summary).await;
        executor.disconnect().await;
        outcome?;

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    async fn generate(&self, summary: &mut RunSummary) -> Result<()> {
        self.process_chunks(summary).await?;

        if summary.interrupted {
            tracing::warn!(
                artifacts = summary.artifacts.len(),
                "Run interrupted, manifest not written"
            );
            return Ok(());
        }

        self.publish_manifest(summary).await;
        Ok(())
    }

    async fn process_chunks(&self, summary: &mut RunSummary) -> Result<()> {
        let chunk_size = self.settings.chunk_size;
        let mut offset: u64 = 0;
        let mut last_timestamp: Option<i64> = None;

        loop {
            summary.final_offset = offset;
            let fetched = match self
                .until_shutdown(self.reader.fetch_chunk(offset, chunk_size))
                .await
            {
                Some(fetched) => fetched,
                None => {
                    self.check_shutdown(summary);
                    break;
                }
            };
            let rows = fetched.map_err(|e| {
                tracing::error!(offset, error = %e, "Chunk query failed");
                FeedError::Query(e)
            })?;

            if rows.is_empty() {
                tracing::info!(offset, "No more rows, chunk loop finished");
                break;
            }

            summary.chunks_fetched += 1;
            summary.rows_fetched += rows.len();

            let records = self.transformer.transform_all(&rows).map_err(|e| {
                tracing::error!(offset, error = %e, "Record transformation failed");
                FeedError::Transform(e)
            })?;

            if self.check_shutdown(summary) {
                break;
            }

            let timestamp = next_artifact_timestamp(
                last_timestamp,
                chrono::Utc::now().timestamp_millis(),
            );
            last_timestamp = Some(timestamp);

            let path = match self.write_artifact(records, timestamp).await {
                Ok(path) => path,
                Err(e) => {
                    tracing::error!(offset, error = %e, "Stopping chunk loop after write failure");
                    summary.write_failed = true;
                    summary.add_error(
                        RunError::new(RunStage::Write, e.to_string())
                            .with_context(format!("offset={offset}")),
                    );
                    break;
                }
            };

            let artifact = file_name(&path);
            summary.artifacts.push(artifact.clone());

            match self.until_shutdown(self.upload(&path, GZIP_ENCODING)).await {
                Some(Ok(())) => summary.uploaded += 1,
                Some(Err(e)) => {
                    summary.add_error(
                        RunError::new(RunStage::Upload, e.to_string()).with_context(&artifact),
                    );
                    summary.failed_uploads.push(artifact.clone());
                }
                None => {
                    tracing::warn!(path = %path.display(), "Upload abandoned, file kept locally");
                    self.check_shutdown(summary);
                    break;
                }
            }

            crate::log_chunk_processed!(offset, rows.len(), artifact);
            offset += chunk_size as u64;
        }

        Ok(())
    }

    async fn write_artifact(
        &self,
        records: Vec<serde_json::Value>,
        timestamp_ms: i64,
    ) -> std::result::Result<PathBuf, WriteError> {
        let writer = self.writer.clone();
        match tokio::task::spawn_blocking(move || writer.write(records, Some(timestamp_ms))).await {
            Ok(result) => result,
            Err(e) => Err(WriteError::Task(e.to_string())),
        }
    }

    async fn publish_manifest(&self, summary: &mut RunSummary) {
        let manifest_writer = self.manifest_writer.clone();
        let artifacts = summary.artifacts.clone();
        let feed_name = self.settings.feed_name.clone();

        let written = match tokio::task::spawn_blocking(move || {
            manifest_writer.write(&artifacts, &feed_name, None)
        })
        .await
        {
            Ok(result) => result,
            Err(e) => Err(WriteError::Task(e.to_string())),
        };

        let path = match written {
            Ok(path) => path,
            Err(e) => {
                summary.add_error(RunError::new(RunStage::Manifest, e.to_string()));
                return;
            }
        };

        match self.until_shutdown(self.upload(&path, IDENTITY_ENCODING)).await {
            Some(Ok(())) => summary.manifest_uploaded = true,
            Some(Err(e)) => summary.add_error(
                RunError::new(RunStage::ManifestUpload, e.to_string())
                    .with_context(file_name(&path)),
            ),
            None => {
                tracing::warn!(path = %path.display(), "Manifest upload abandoned");
                self.check_shutdown(summary);
            }
        }
        summary.manifest = Some(path);
    }

    async fn upload(
        &self,
        path: &Path,
        content_encoding: &str,
    ) -> std::result::Result<(), UploadError> {
        self.uploader
            .upload(path, JSON_CONTENT_TYPE, content_encoding)
            .await
            .map_err(|e| {
                tracing::error!(
                    path = %path.display(),
                    backend = self.uploader.backend_name(),
                    error = %e,
                    "Upload failed, continuing"
                );
                e
            })
    }

    /// Drive `operation` unless shutdown is requested first
    ///
    /// Returns `None` when the signal wins; `operation` is dropped mid-flight.
    async fn until_shutdown<F: Future>(&self, operation: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = shutdown_requested(self.shutdown_signal.clone()) => None,
            output = operation => Some(output),
        }
    }

    fn check_shutdown(&self, summary: &mut RunSummary) -> bool {
        if *self.shutdown_signal.borrow() {
            if !summary.interrupted {
                tracing::info!(
                    offset = summary.final_offset,
                    "Shutdown signal received, stopping run"
                );
            }
            summary.interrupted = true;
        }
        summary.interrupted
    }
}

// A dropped sender never requests shutdown
async fn shutdown_requested(mut signal: watch::Receiver<bool>) {
    if signal.wait_for(|requested| *requested).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Millisecond timestamp for the next artifact
///
/// Strictly increasing within a run so that artifact names never collide.
pub fn next_artifact_timestamp(previous: Option<i64>, now_ms: i64) -> i64 {
    match previous {
        Some(prev) if now_ms <= prev => prev + 1,
        _ => now_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_timestamp_is_now() {
        assert_eq!(next_artifact_timestamp(None, 1_000), 1_000);
    }

    #[test]
    fn test_timestamp_advances_with_clock() {
        assert_eq!(next_artifact_timestamp(Some(1_000), 1_005), 1_005);
    }

    #[test]
    fn test_colliding_timestamp_is_bumped() {
        assert_eq!(next_artifact_timestamp(Some(1_000), 1_000), 1_001);
        assert_eq!(next_artifact_timestamp(Some(1_000), 990), 1_001);
    }
}
