//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod init;
pub mod run;
pub mod validate;

/// Exit code for a completed run
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for configuration errors
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Exit code when the source database could not be reached
pub const EXIT_CONNECTION_ERROR: i32 = 4;

/// Exit code for any other fatal error
pub const EXIT_FATAL_ERROR: i32 = 5;

/// Exit code for a run stopped by SIGINT/SIGTERM
pub const EXIT_INTERRUPTED: i32 = 130;
