//! Record transformation
//!
//! A transformer turns one [`RawRecord`] into one feed entry. The pipeline is
//! agnostic of the output shape; it only needs [`RecordTransformer`].
//!
//! # Examples
//!
//! ```
//! use entity_feed::core::transform::create_transformer;
//! use entity_feed::domain::{FeedType, RawRecord};
//!
//! let transformer = create_transformer(FeedType::Facility);
//! let row = RawRecord::new()
//!     .with("id", 1)
//!     .with("name", "Clinic")
//!     .with("phone", "555-0100")
//!     .with("url", "https://clinic.example.com")
//!     .with("latitude", 1.0)
//!     .with("longitude", 2.0)
//!     .with("country", "US")
//!     .with("locality", "Springfield")
//!     .with("region", "IL")
//!     .with("postal_code", "62701")
//!     .with("street_address", "1 Main St");
//!
//! let entry = transformer.transform(&row).unwrap();
//! assert_eq!(entry["entity_id"], 1);
//! assert_eq!(entry["location"]["address"]["region"], "IL");
//! ```

pub mod facility;

pub use facility::FacilityTransformer;

use crate::domain::{FeedType, RawRecord, TransformError};
use serde_json::Value;

/// Pure function from a source row to a feed entry
pub trait RecordTransformer: Send + Sync {
    /// Feed type the transformer produces entries for
    fn feed_type(&self) -> FeedType;

    /// Transform one row
    ///
    /// # Errors
    ///
    /// Returns a [`TransformError`] when the row lacks data the feed schema
    /// requires.
    fn transform(&self, record: &RawRecord) -> Result<Value, TransformError>;

    /// Transform a chunk, stopping at the first failing row
    fn transform_all(&self, records: &[RawRecord]) -> Result<Vec<Value>, TransformError> {
        records.iter().map(|r| self.transform(r)).collect()
    }
}

/// Transformer for a feed type
pub fn create_transformer(feed_type: FeedType) -> Box<dyn RecordTransformer> {
    match feed_type {
        FeedType::Facility => Box::new(FacilityTransformer),
    }
}
