//! Feed generation run
//!
//! [`PipelineOrchestrator`] owns the chunk loop; [`RunSummary`] reports what a
//! run produced.

pub mod orchestrator;
pub mod summary;

pub use orchestrator::{next_artifact_timestamp, PipelineOrchestrator, PipelineSettings};
pub use summary::{RunError, RunStage, RunSummary};
