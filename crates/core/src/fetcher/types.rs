//! Types for item fetcher operations.

use async_trait::async_trait;
use thiserror::Error;

use crate::job::{Job, JobId};

/// Errors that can occur while fetching an item.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Fetcher binary not found: {0}")]
    BinaryNotFound(String),

    #[error("Fetch exited with code {code}")]
    NonZeroExit { code: i32 },

    #[error("Fetch interrupted by stop request")]
    Interrupted,

    #[error("Stop request failed: {0}")]
    StopFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for single-item download backends.
///
/// A fetch is the sole suspension point of an orchestrator worker: it
/// resolves to success or failure, or is cut short by a concurrent
/// [`request_stop`](Fetcher::request_stop).
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Perform one job to completion.
    async fn fetch(&self, job: &Job) -> Result<(), FetchError>;

    /// Best-effort request to stop an in-flight fetch.
    ///
    /// Idempotent: calling it for a job that already finished (or was never
    /// started) succeeds without effect.
    async fn request_stop(&self, id: &JobId) -> Result<(), FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FetchError::BinaryNotFound("yt-dlp".to_string());
        assert_eq!(err.to_string(), "Fetcher binary not found: yt-dlp");

        let err = FetchError::NonZeroExit { code: 1 };
        assert_eq!(err.to_string(), "Fetch exited with code 1");

        let err = FetchError::Interrupted;
        assert_eq!(err.to_string(), "Fetch interrupted by stop request");
    }
}
