//! Result type alias for entity-feed

use super::errors::FeedError;

/// Result type alias for entity-feed operations
///
/// # Examples
///
/// ```
/// use entity_feed::domain::result::Result;
/// use entity_feed::domain::errors::FeedError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(FeedError::Other("boom".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, FeedError>;
