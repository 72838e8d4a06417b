//! Local directory storage backend
//!
//! Copies files into a directory, keyed by file name. Useful for dry runs and
//! for inspecting generated feeds without cloud credentials.

use crate::adapters::storage::traits::{file_name, StorageBackend};
use crate::domain::StorageError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Directory implementation of [`StorageBackend`]
pub struct LocalBackend {
    directory: PathBuf,
}

impl LocalBackend {
    /// Create a backend writing into `directory` (created on first upload)
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn target(&self, path: &Path) -> PathBuf {
        self.directory.join(file_name(path))
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        "local"
    }

    fn destination(&self, path: &Path) -> String {
        self.target(path).display().to_string()
    }

    async fn put_file(
        &self,
        path: &Path,
        _content_type: &str,
        _content_encoding: &str,
    ) -> Result<(), StorageError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(StorageError::Source {
                path: path.display().to_string(),
                message: "file does not exist".to_string(),
            });
        }

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| {
                StorageError::Client(format!(
                    "Failed to create {}: {e}",
                    self.directory.display()
                ))
            })?;

        let target = self.target(path);
        tokio::fs::copy(path, &target).await.map_err(|e| {
            StorageError::Client(format!("Failed to copy to {}: {e}", target.display()))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_file_copies_into_directory() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("facility_feed_1.json.gz");
        std::fs::write(&source, b"payload").unwrap();

        let backend = LocalBackend::new(dir.path().join("local_storage"));
        backend
            .put_file(&source, "application/json", "gzip")
            .await
            .unwrap();

        let copied = dir.path().join("local_storage/facility_feed_1.json.gz");
        assert_eq!(std::fs::read(copied).unwrap(), b"payload");
        // The backend never removes the source
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_missing_source_is_not_retryable() {
        let dir = TempDir::new().unwrap();
        let backend = LocalBackend::new(dir.path().join("dest"));

        let err = backend
            .put_file(&dir.path().join("missing.json.gz"), "application/json", "gzip")
            .await
            .unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_destination_uses_file_name() {
        let backend = LocalBackend::new("local_storage");
        assert_eq!(
            backend.destination(Path::new("/tmp/out/metadata.json")),
            Path::new("local_storage").join("metadata.json").display().to_string()
        );
    }
}
