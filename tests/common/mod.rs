//! In-memory collaborators for pipeline tests

#![allow(dead_code)]

use async_trait::async_trait;
use entity_feed::adapters::database::{QueryExecutor, QueryParam};
use entity_feed::adapters::storage::StorageBackend;
use entity_feed::config::DatabaseEngine;
use entity_feed::core::pipeline::PipelineSettings;
use entity_feed::core::retry::RetryPolicy;
use entity_feed::domain::{ConnectionError, FeedType, QueryError, RawRecord, StorageError};
use fake::faker::address::en::{CityName, StateAbbr, StreetName, ZipCode};
use fake::faker::company::en::CompanyName;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use flate2::read::GzDecoder;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;

/// One facility row with id `id` and generated contents
pub fn facility_row(id: i64) -> RawRecord {
    RawRecord::new()
        .with("id", id)
        .with("name", CompanyName().fake::<String>())
        .with("phone", PhoneNumber().fake::<String>())
        .with("url", format!("https://facility-{id}.example.com"))
        .with("latitude", (-90.0..90.0).fake::<f64>())
        .with("longitude", (-180.0..180.0).fake::<f64>())
        .with("country", "US")
        .with("locality", CityName().fake::<String>())
        .with("region", StateAbbr().fake::<String>())
        .with("postal_code", ZipCode().fake::<String>())
        .with("street_address", StreetName().fake::<String>())
}

/// `count` facility rows with ids 1..=count
pub fn facility_rows(count: usize) -> Vec<RawRecord> {
    (1..=count as i64).map(facility_row).collect()
}

/// Table-backed executor honouring offset/limit
pub struct MemoryExecutor {
    rows: Vec<RawRecord>,
    fail_connect: bool,
    fail_query: bool,
    /// Signal shutdown while serving the n-th fetch (1-based)
    shutdown_on_fetch: Option<(usize, watch::Sender<bool>)>,
    /// Never answer the n-th fetch (1-based)
    hang_on_fetch: Option<usize>,
    pub fetches: Mutex<Vec<(i64, i64)>>,
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
}

impl MemoryExecutor {
    pub fn new(rows: Vec<RawRecord>) -> Self {
        Self {
            rows,
            fail_connect: false,
            fail_query: false,
            shutdown_on_fetch: None,
            hang_on_fetch: None,
            fetches: Mutex::new(Vec::new()),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        }
    }

    pub fn failing_connect() -> Self {
        Self {
            fail_connect: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn failing_query() -> Self {
        Self {
            fail_query: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_shutdown_on_fetch(mut self, fetch: usize, sender: watch::Sender<bool>) -> Self {
        self.shutdown_on_fetch = Some((fetch, sender));
        self
    }

    pub fn hanging_on_fetch(mut self, fetch: usize) -> Self {
        self.hang_on_fetch = Some(fetch);
        self
    }

    pub fn fetch_offsets(&self) -> Vec<i64> {
        self.fetches.lock().unwrap().iter().map(|(o, _)| *o).collect()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

#[async_trait]
impl QueryExecutor for MemoryExecutor {
    fn engine(&self) -> DatabaseEngine {
        DatabaseEngine::Postgres
    }

    async fn connect(&self, policy: &RetryPolicy) -> Result<(), ConnectionError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect {
            return Err(ConnectionError::Exhausted {
                engine: "postgres".to_string(),
                attempts: policy.max_attempts,
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    async fn execute(&self, _query: &str, params: &[QueryParam]) -> Result<Vec<RawRecord>, QueryError> {
        let (offset, limit) = (params[0], params[1]);
        let fetch = {
            let mut fetches = self.fetches.lock().unwrap();
            fetches.push((offset, limit));
            fetches.len()
        };

        if let Some((n, sender)) = &self.shutdown_on_fetch {
            if *n == fetch {
                let _ = sender.send(true);
            }
        }

        if self.hang_on_fetch == Some(fetch) {
            std::future::pending::<()>().await;
        }

        if self.fail_query {
            return Err(QueryError::Execution("relation \"facility\" does not exist".to_string()));
        }

        Ok(self
            .rows
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

/// One `put_file` call
#[derive(Debug, Clone)]
pub struct PutCall {
    pub file_name: String,
    pub content_type: String,
    pub content_encoding: String,
    pub bytes: Vec<u8>,
    pub succeeded: bool,
}

/// Storage backend keeping uploaded bytes in memory
///
/// Files are numbered in order of their first upload attempt; files whose
/// number is in `failing` fail every attempt.
#[derive(Default)]
pub struct MemoryStorage {
    failing: HashSet<usize>,
    hanging: bool,
    seen: Mutex<Vec<String>>,
    pub calls: Mutex<Vec<PutCall>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_files(files: impl IntoIterator<Item = usize>) -> Self {
        Self {
            failing: files.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Every upload stalls forever
    pub fn hanging() -> Self {
        Self {
            hanging: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<PutCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uploaded(&self, file_name: &str) -> Option<Vec<u8>> {
        self.calls()
            .into_iter()
            .find(|c| c.succeeded && c.file_name == file_name)
            .map(|c| c.bytes)
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn destination(&self, path: &Path) -> String {
        format!("memory://{}", path.display())
    }

    async fn put_file(
        &self,
        path: &Path,
        content_type: &str,
        content_encoding: &str,
    ) -> Result<(), StorageError> {
        if self.hanging {
            std::future::pending::<()>().await;
        }

        let bytes = std::fs::read(path).map_err(|e| StorageError::Source {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let index = {
            let mut seen = self.seen.lock().unwrap();
            match seen.iter().position(|n| *n == file_name) {
                Some(i) => i,
                None => {
                    seen.push(file_name.clone());
                    seen.len() - 1
                }
            }
        };
        let succeeded = !self.failing.contains(&index);

        self.calls.lock().unwrap().push(PutCall {
            file_name,
            content_type: content_type.to_string(),
            content_encoding: content_encoding.to_string(),
            bytes,
            succeeded,
        });

        if succeeded {
            Ok(())
        } else {
            Err(StorageError::Client("503 Slow Down".to_string()))
        }
    }
}

/// Settings with zero backoff so tests do not sleep
pub fn settings(output_dir: impl Into<PathBuf>, chunk_size: usize) -> PipelineSettings {
    PipelineSettings {
        feed_type: FeedType::Facility,
        feed_name: "reservewithgoogle.entity".to_string(),
        chunk_size,
        output_dir: output_dir.into(),
        connect_policy: RetryPolicy::new(3, Duration::ZERO),
        upload_policy: RetryPolicy::new(3, Duration::ZERO),
    }
}

/// Decode an uploaded artifact into its `data` array
pub fn decode_artifact(bytes: &[u8]) -> Vec<Value> {
    let mut text = String::new();
    GzDecoder::new(bytes).read_to_string(&mut text).unwrap();
    let document: Value = serde_json::from_str(&text).unwrap();
    document["data"].as_array().cloned().unwrap_or_default()
}

/// Parse an uploaded manifest
pub fn decode_manifest(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or_else(|_| json!(null))
}
