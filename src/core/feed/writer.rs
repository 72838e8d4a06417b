//! Gzip feed artifact writer
//!
//! Streams `{"data": [...]}` through a gzip encoder straight to disk. A
//! failed write removes the partial file so a truncated artifact is never
//! left behind for upload.

use crate::domain::{FeedDocument, FeedType, WriteError};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes one compressed artifact per chunk
#[derive(Debug, Clone)]
pub struct FeedWriter {
    output_dir: PathBuf,
    feed_type: FeedType,
}

impl FeedWriter {
    /// Create a writer placing artifacts in `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>, feed_type: FeedType) -> Self {
        Self {
            output_dir: output_dir.into(),
            feed_type,
        }
    }

    /// Directory artifacts are written to
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the artifact for `timestamp_ms` is written to
    pub fn artifact_path(&self, timestamp_ms: i64) -> PathBuf {
        self.output_dir
            .join(self.feed_type.artifact_file_name(timestamp_ms))
    }

    /// Write `records` as a gzip-compressed feed document
    ///
    /// `timestamp_ms` names the file; the current time is used when absent.
    /// This performs blocking I/O.
    ///
    /// # Errors
    ///
    /// Returns a [`WriteError`] after logging it; no file is left behind.
    pub fn write(&self, records: Vec<Value>, timestamp_ms: Option<i64>) -> Result<PathBuf, WriteError> {
        let timestamp_ms = timestamp_ms.unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
        let path = self.artifact_path(timestamp_ms);
        let count = records.len();
        let document = FeedDocument { data: records };

        match write_gzip_json(&path, &document) {
            Ok(bytes) => {
                tracing::info!(
                    path = %path.display(),
                    records = count,
                    compressed_bytes = bytes,
                    "Feed file written"
                );
                Ok(path)
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to write feed file");
                let _ = std::fs::remove_file(&path);
                Err(e)
            }
        }
    }
}

fn write_gzip_json(path: &Path, document: &FeedDocument) -> Result<u64, WriteError> {
    let file = File::create(path).map_err(|e| WriteError::io(path, e))?;
    let buf_writer = BufWriter::with_capacity(64 * 1024, file);
    let mut encoder = GzEncoder::new(buf_writer, Compression::default());

    serde_json::to_writer(&mut encoder, document).map_err(|e| {
        if e.is_io() {
            WriteError::io(path, e)
        } else {
            WriteError::Serialization(e.to_string())
        }
    })?;

    let mut buf_writer = encoder.finish().map_err(|e| WriteError::io(path, e))?;
    buf_writer.flush().map_err(|e| WriteError::io(path, e))?;

    let file = buf_writer
        .into_inner()
        .map_err(|e| WriteError::io(path, e.error()))?;
    file.sync_all().map_err(|e| WriteError::io(path, e))?;

    let bytes = file.metadata().map(|m| m.len()).unwrap_or(0);
    Ok(bytes)
}
