//! Amazon S3 storage backend
//!
//! Objects are keyed by `key_prefix` followed by the artifact file name and
//! carry the Content-Type / Content-Encoding headers given by the caller, so
//! gzip artifacts are served with `Content-Encoding: gzip`.

use crate::adapters::storage::traits::{file_name, StorageBackend};
use crate::config::S3Config;
use crate::domain::StorageError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use secrecy::ExposeSecret;
use std::path::Path;

/// S3 implementation of [`StorageBackend`]
pub struct S3Backend {
    client: Client,
    bucket: String,
    key_prefix: String,
}

impl S3Backend {
    /// Build an S3 client from configuration
    ///
    /// Static credentials are used when configured; otherwise the default AWS
    /// credential chain (environment, profile, instance role) applies.
    pub async fn new(config: &S3Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = Credentials::new(
                access_key,
                secret_key.expose_secret().as_str(),
                None,
                None,
                "entity-feed",
            );
            loader = loader.credentials_provider(credentials);
        }

        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style);

        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            "S3 client initialized"
        );

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            key_prefix: config.key_prefix.clone(),
        }
    }

    /// Object key for a local file
    pub fn object_key(&self, path: &Path) -> String {
        object_key(&self.key_prefix, path)
    }
}

fn object_key(prefix: &str, path: &Path) -> String {
    format!("{prefix}{}", file_name(path))
}

#[async_trait]
impl StorageBackend for S3Backend {
    fn name(&self) -> &str {
        "s3"
    }

    fn destination(&self, path: &Path) -> String {
        format!("s3://{}/{}", self.bucket, self.object_key(path))
    }

    async fn put_file(
        &self,
        path: &Path,
        content_type: &str,
        content_encoding: &str,
    ) -> Result<(), StorageError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::Source {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.object_key(path))
            .body(body)
            .content_type(content_type)
            .content_encoding(content_encoding)
            .send()
            .await
            .map_err(|e| StorageError::Client(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}
