//! Run manifest writer

use crate::domain::{Manifest, WriteError, MANIFEST_FILE_NAME};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes the uncompressed `metadata.json` listing a run's artifacts
#[derive(Debug, Clone)]
pub struct ManifestWriter {
    output_dir: PathBuf,
}

impl ManifestWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Location of the manifest
    pub fn path(&self) -> PathBuf {
        self.output_dir.join(MANIFEST_FILE_NAME)
    }

    /// Write the manifest, replacing any previous one
    ///
    /// `timestamp_s` defaults to the current time in whole seconds.
    pub fn write(
        &self,
        data_files: &[String],
        feed_name: &str,
        timestamp_s: Option<i64>,
    ) -> Result<PathBuf, WriteError> {
        let manifest = Manifest {
            generation_timestamp: timestamp_s.unwrap_or_else(|| chrono::Utc::now().timestamp()),
            name: feed_name.to_string(),
            data_file: data_files.to_vec(),
        };
        let path = self.path();

        match write_json(&path, &manifest) {
            Ok(()) => {
                tracing::info!(
                    path = %path.display(),
                    data_files = manifest.data_file.len(),
                    "Manifest written"
                );
                Ok(path)
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to write manifest");
                Err(e)
            }
        }
    }
}

fn write_json(path: &Path, manifest: &Manifest) -> Result<(), WriteError> {
    let file = File::create(path).map_err(|e| WriteError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, manifest).map_err(|e| {
        if e.is_io() {
            WriteError::io(path, e)
        } else {
            WriteError::Serialization(e.to_string())
        }
    })?;
    writer.flush().map_err(|e| WriteError::io(path, e))
}
