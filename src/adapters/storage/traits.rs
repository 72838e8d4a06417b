//! Storage backend abstraction

use crate::domain::StorageError;
use async_trait::async_trait;
use std::path::Path;

/// Single-attempt file transfer to a storage destination
///
/// Backends perform exactly one attempt per call and never delete the local
/// file; retries and cleanup belong to the
/// [`Uploader`](crate::adapters::storage::Uploader).
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short backend name for logs ("s3", "local")
    fn name(&self) -> &str;

    /// Destination the file at `path` is written to
    fn destination(&self, path: &Path) -> String;

    /// Transfer the file at `path`, tagging it with the given content type and
    /// content encoding where the backend supports metadata
    ///
    /// # Errors
    ///
    /// [`StorageError::Source`] when the local file cannot be read,
    /// [`StorageError::Client`] for any failure at the destination.
    async fn put_file(
        &self,
        path: &Path,
        content_type: &str,
        content_encoding: &str,
    ) -> Result<(), StorageError>;
}

/// Final path component of `path`, or the whole path when it has none
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
