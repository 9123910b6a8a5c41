//! Testing utilities and mock implementations for lifecycle tests.
//!
//! This module provides a mock fetcher with controllable behavior, allowing
//! orchestrator runs to be exercised without spawning real processes.
//!
//! # Example
//!
//! ```rust,ignore
//! use grabbit_core::testing::{fixtures, MockFetcher};
//!
//! let fetcher = MockFetcher::new();
//!
//! // Configure mock behavior
//! fetcher.set_fetch_duration(Duration::from_millis(10)).await;
//! fetcher.fail_job(&JobId::new("broken")).await;
//!
//! // Run the orchestrator, then assert on recorded calls
//! let fetched = fetcher.fetched_jobs().await;
//! ```

mod mock_fetcher;

pub use mock_fetcher::MockFetcher;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::job::{Job, MediaFormat};

    /// Create a test job with reasonable defaults.
    pub fn job(id: &str) -> Job {
        Job::new(
            id,
            format!("https://www.youtube.com/watch?v={}", id),
            MediaFormat::Video,
            "/tmp/grabbit-test",
        )
    }

    /// Create a batch of test jobs in the given order.
    pub fn jobs(ids: &[&str]) -> Vec<Job> {
        ids.iter().map(|id| job(id)).collect()
    }
}
