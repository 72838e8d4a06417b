//! Domain models and types for entity-feed.
//!
//! The domain layer provides:
//! - **Records** ([`RawRecord`] rows in, [`FacilityRecord`] entries out)
//! - **Feed descriptors** ([`FeedType`], [`FeedDocument`], [`Manifest`])
//! - **Error types** ([`FeedError`] and the per-component errors)
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, FeedError>`]:
//!
//! ```rust
//! use entity_feed::domain::{FeedType, Result};
//! use std::str::FromStr;
//!
//! fn example() -> Result<()> {
//!     let feed_type = FeedType::from_str("facility")?;
//!     assert_eq!(feed_type.as_str(), "facility");
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod errors;
pub mod facility;
pub mod feed;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{
    ConnectionError, FeedError, QueryError, StorageError, TransformError, UploadError, WriteError,
};
pub use facility::{Address, FacilityRecord, Location};
pub use feed::{FeedDocument, FeedType, Manifest, MANIFEST_FILE_NAME};
pub use record::RawRecord;
pub use result::Result;
