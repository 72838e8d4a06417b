//! Storage backend factory

use crate::adapters::storage::local::LocalBackend;
use crate::adapters::storage::s3::S3Backend;
use crate::adapters::storage::traits::StorageBackend;
use crate::config::{StorageBackendKind, StorageConfig};
use crate::domain::{FeedError, Result};
use std::sync::Arc;

/// Create the configured storage backend
///
/// # Errors
///
/// Returns a configuration error when `backend = "s3"` has no `[storage.s3]`
/// section.
pub async fn create_storage_backend(config: &StorageConfig) -> Result<Arc<dyn StorageBackend>> {
    match config.backend {
        StorageBackendKind::S3 => {
            let s3_config = config.s3.as_ref().ok_or_else(|| {
                FeedError::Configuration(
                    "storage.s3 configuration is required when storage.backend = 's3'"
                        .to_string(),
                )
            })?;

            tracing::info!(bucket = %s3_config.bucket, "Creating S3 storage backend");
            Ok(Arc::new(S3Backend::new(s3_config).await))
        }
        StorageBackendKind::Local => {
            tracing::info!(
                directory = %config.local.directory,
                "Creating local storage backend"
            );
            Ok(Arc::new(LocalBackend::new(&config.local.directory)))
        }
    }
}
