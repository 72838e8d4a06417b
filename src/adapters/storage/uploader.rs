//! Retrying uploader
//!
//! Wraps a [`StorageBackend`] with the shared backoff primitive. A successful
//! upload removes the local file; a failed one leaves it in place so the
//! artifact can be inspected or re-sent.

use crate::adapters::storage::traits::StorageBackend;
use crate::core::retry::{retry_with_backoff, RetryPolicy};
use crate::domain::{StorageError, UploadError};
use std::path::Path;
use std::sync::Arc;

/// Moves local artifacts to a storage backend
#[derive(Clone)]
pub struct Uploader {
    backend: Arc<dyn StorageBackend>,
    policy: RetryPolicy,
}

impl Uploader {
    /// Create an uploader with the given retry policy
    pub fn new(backend: Arc<dyn StorageBackend>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    /// Backend name for logs
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Upload `path` under the configured retry policy
    ///
    /// The local file is deleted once the backend accepts it.
    ///
    /// # Errors
    ///
    /// [`UploadError::Exhausted`] after `max_attempts` retryable failures,
    /// [`UploadError::NotRetryable`] on the first error that retrying cannot
    /// fix. The file is left in place in both cases.
    pub async fn upload(
        &self,
        path: &Path,
        content_type: &str,
        content_encoding: &str,
    ) -> Result<(), UploadError> {
        let destination = self.backend.destination(path);
        let resource = path.display().to_string();

        retry_with_backoff(
            &self.policy,
            "upload",
            &resource,
            StorageError::is_retryable,
            |attempt| {
                let destination = destination.as_str();
                async move {
                    self.backend
                        .put_file(path, content_type, content_encoding)
                        .await?;
                    tracing::info!(
                        path = %path.display(),
                        destination,
                        attempt,
                        "File uploaded"
                    );
                    Ok::<(), StorageError>(())
                }
            },
        )
        .await
        .map_err(|failure| {
            let path = path.display().to_string();
            let message = failure.last_error.to_string();
            if failure.exhausted {
                UploadError::Exhausted {
                    path,
                    attempts: failure.attempts,
                    message,
                }
            } else {
                UploadError::NotRetryable { path, message }
            }
        })?;

        remove_local(path).await;
        Ok(())
    }
}

// Failing to delete does not undo the upload
async fn remove_local(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Local file deleted after upload"),
        Err(e) => tracing::error!(
            path = %path.display(),
            error = %e,
            "Failed to delete local file after upload"
        ),
    }
}
