//! Artifact storage
//!
//! [`StorageBackend`] implementations perform one transfer attempt;
//! [`Uploader`] adds retry with backoff and local cleanup on top.

pub mod factory;
pub mod local;
pub mod s3;
pub mod traits;
pub mod uploader;

pub use factory::create_storage_backend;
pub use local::LocalBackend;
pub use s3::S3Backend;
pub use traits::StorageBackend;
pub use uploader::Uploader;
