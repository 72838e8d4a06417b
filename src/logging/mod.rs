//! Logging and observability
//!
//! Structured logging through `tracing`. Library code only emits events; the
//! subscriber is installed once by the binary via [`init_logging`].
//!
//! # Example
//!
//! ```no_run
//! use entity_feed::logging::init_logging;
//! use entity_feed::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(offset = 0, "Fetching chunk");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a finished chunk
///
/// # Example
///
/// ```no_run
/// use entity_feed::log_chunk_processed;
///
/// log_chunk_processed!(200, 100, "facility_feed_1700000000000.json.gz");
/// ```
#[macro_export]
macro_rules! log_chunk_processed {
    ($offset:expr, $rows:expr, $artifact:expr) => {
        tracing::info!(
            offset = $offset,
            rows = $rows,
            artifact = %$artifact,
            "Chunk processed"
        );
    };
}

/// Log the end of a run
///
/// # Example
///
/// ```no_run
/// use entity_feed::log_run_complete;
/// use std::time::Duration;
///
/// log_run_complete!(3, 250, Duration::from_secs(4));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($artifacts:expr, $rows:expr, $duration:expr) => {
        tracing::info!(
            artifacts = $artifacts,
            rows = $rows,
            duration_ms = $duration.as_millis() as u64,
            "Feed run completed"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use entity_feed::log_retry_attempt;
/// use std::time::Duration;
///
/// log_retry_attempt!(
///     "connect",
///     "db.internal:5432/places",
///     2,
///     3,
///     Duration::from_secs(2),
///     "Connection refused"
/// );
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($operation:expr, $resource:expr, $attempt:expr, $max_attempts:expr, $delay:expr, $reason:expr) => {
        tracing::warn!(
            operation = $operation,
            resource = %$resource,
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay.as_millis() as u64,
            reason = %$reason,
            "Attempt failed, retrying"
        );
    };
}
