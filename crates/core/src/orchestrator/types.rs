//! Types for the download orchestrator.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::job::JobId;

/// Errors that can occur when driving a run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Concurrency limit below 1.
    #[error("concurrency limit must be at least 1")]
    InvalidConcurrency,

    /// A run is already in progress.
    #[error("a run is already active")]
    RunActive,

    /// Pause or cancel called with nothing to act on.
    #[error("no active run")]
    NoActiveRun,

    /// A stop was already requested for the current run.
    #[error("a stop was already requested for this run")]
    AlreadyStopping,

    /// Resume called while the previous run did not end in a pause.
    #[error("no paused run to resume")]
    NotPaused,
}

/// Stop request state for a run.
///
/// Set at most once while a run is active; workers observe it before every
/// queue pull and never admit new work afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopSignal {
    #[default]
    None,
    PauseRequested,
    CancelRequested,
}

/// Terminal classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The queue drained with no stop requested.
    Complete,
    /// Stopped with queue position retained; resumable.
    Paused,
    /// Stopped with the queue discarded.
    Canceled,
}

impl RunOutcome {
    /// Returns the string representation for status output.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Complete => "complete",
            RunOutcome::Paused => "paused",
            RunOutcome::Canceled => "canceled",
        }
    }
}

/// Snapshot of the live run state, for a polling presentation layer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStatus {
    /// Whether workers are currently alive.
    pub running: bool,
    /// Jobs currently executing, with their last progress line.
    pub active: HashMap<JobId, String>,
    /// Jobs not yet started, in selection order.
    pub pending: Vec<JobId>,
    /// Jobs that finished successfully in this logical batch.
    pub completed: HashSet<JobId>,
    /// Number of jobs selected at the start of the batch.
    pub total_target: usize,
    /// Terminal outcome of the last run, if it ended.
    pub outcome: Option<RunOutcome>,
    /// Human-readable status line.
    pub message: String,
    /// When the current run started.
    pub started_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_signal_defaults_to_none() {
        assert_eq!(StopSignal::default(), StopSignal::None);
    }

    #[test]
    fn test_run_outcome_as_str() {
        assert_eq!(RunOutcome::Complete.as_str(), "complete");
        assert_eq!(RunOutcome::Paused.as_str(), "paused");
        assert_eq!(RunOutcome::Canceled.as_str(), "canceled");
    }

    #[test]
    fn test_run_status_default() {
        let status = RunStatus::default();
        assert!(!status.running);
        assert!(status.active.is_empty());
        assert!(status.pending.is_empty());
        assert_eq!(status.total_target, 0);
        assert_eq!(status.outcome, None);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            OrchestratorError::InvalidConcurrency.to_string(),
            "concurrency limit must be at least 1"
        );
        assert_eq!(
            OrchestratorError::NotPaused.to_string(),
            "no paused run to resume"
        );
    }

    #[test]
    fn test_run_outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&RunOutcome::Paused).unwrap(),
            "\"paused\""
        );
    }
}
