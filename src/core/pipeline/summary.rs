//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting the outcome of
//! one pipeline run.

use std::path::PathBuf;
use std::time::Duration;

/// Summary of a pipeline run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Non-empty chunks fetched from the source
    pub chunks_fetched: usize,

    /// Source rows fetched
    pub rows_fetched: usize,

    /// Artifact file names in generation order, as listed in the manifest
    pub artifacts: Vec<String>,

    /// Artifacts uploaded successfully
    pub uploaded: usize,

    /// Artifacts whose upload failed; they are still listed in the manifest
    pub failed_uploads: Vec<String>,

    /// The loop ended early because an artifact could not be written
    pub write_failed: bool,

    /// Local manifest path, if it was written
    pub manifest: Option<PathBuf>,

    /// Whether the manifest upload succeeded
    pub manifest_uploaded: bool,

    /// The run stopped on a shutdown signal; no manifest was written
    pub interrupted: bool,

    /// Offset of the fetch that ended the loop
    pub final_offset: u64,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Recoverable errors encountered during the run
    pub errors: Vec<RunError>,
}

impl RunSummary {
    /// Create a new empty run summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: RunError) {
        self.errors.push(error);
    }

    /// Every artifact and the manifest were written and uploaded
    pub fn is_successful(&self) -> bool {
        !self.interrupted
            && !self.write_failed
            && self.failed_uploads.is_empty()
            && self.manifest_uploaded
            && self.errors.is_empty()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        crate::log_run_complete!(self.artifacts.len(), self.rows_fetched, self.duration);

        tracing::info!(
            chunks = self.chunks_fetched,
            uploaded = self.uploaded,
            failed_uploads = self.failed_uploads.len(),
            final_offset = self.final_offset,
            manifest = ?self.manifest,
            manifest_uploaded = self.manifest_uploaded,
            interrupted = self.interrupted,
            "Run summary"
        );

        if !self.failed_uploads.is_empty() {
            tracing::warn!(
                files = ?self.failed_uploads,
                "Manifest lists artifacts that were not uploaded"
            );
        }

        for error in &self.errors {
            tracing::warn!(
                stage = error.stage.as_str(),
                message = %error.message,
                context = ?error.context,
                "Run error"
            );
        }
    }
}

/// Pipeline stage an error occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Write,
    Upload,
    Manifest,
    ManifestUpload,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStage::Write => "write",
            RunStage::Upload => "upload",
            RunStage::Manifest => "manifest",
            RunStage::ManifestUpload => "manifest_upload",
        }
    }
}

/// Recoverable run error with context
#[derive(Debug, Clone)]
pub struct RunError {
    /// Stage that failed
    pub stage: RunStage,

    /// Error message
    pub message: String,

    /// Optional context (e.g. offset, file name)
    pub context: Option<String>,
}

impl RunError {
    pub fn new(stage: RunStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}
