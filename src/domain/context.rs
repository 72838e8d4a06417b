//! Error context extension trait
//!
//! `.context()` / `.with_context()` for `Result<T, E>` where `E` converts into
//! [`FeedError`], so library code can attach the file or stage it was working
//! on without switching to `anyhow`.
//!
//! ```rust
//! use entity_feed::domain::context::ResultExt;
//! use entity_feed::domain::Result;
//!
//! fn read_template(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
//! }
//! # let _ = read_template("missing.toml");
//! ```

use crate::domain::errors::FeedError;
use crate::domain::result::Result;
use std::fmt::Display;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add lazily computed context to an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<FeedError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| wrap(e.into(), context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| wrap(e.into(), f()))
    }
}

// Configuration errors keep their variant so the CLI still maps them to the
// configuration exit code.
fn wrap(base: FeedError, context: impl Display) -> FeedError {
    match base {
        FeedError::Configuration(msg) => FeedError::Configuration(format!("{context}: {msg}")),
        other => FeedError::Other(format!("{context}: {other}")),
    }
}
