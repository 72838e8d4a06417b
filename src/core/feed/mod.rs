//! Feed artifact and manifest output

pub mod manifest;
pub mod writer;

pub use manifest::ManifestWriter;
pub use writer::FeedWriter;
