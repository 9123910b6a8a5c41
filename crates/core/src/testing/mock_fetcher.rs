//! Mock fetcher for testing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Notify, RwLock};

use crate::fetcher::{FetchError, Fetcher};
use crate::job::{Job, JobId};
use crate::progress::{ProgressEvent, ProgressHub};

/// A recorded fetch invocation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedFetch {
    /// Id of the fetched job.
    pub job_id: JobId,
    /// When the fetch started.
    pub timestamp: DateTime<Utc>,
}

/// Mock implementation of the Fetcher trait.
///
/// Provides controllable behavior for testing:
/// - Track fetch invocations and stop requests for assertions
/// - Script per-job failures
/// - Simulate slow downloads that a stop request interrupts mid-flight
#[derive(Debug, Default)]
pub struct MockFetcher {
    /// Recorded fetch calls in claim order.
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
    /// Recorded stop requests in arrival order.
    stops: Arc<RwLock<Vec<JobId>>>,
    /// Jobs scripted to fail.
    failing: Arc<RwLock<HashSet<JobId>>>,
    /// Simulated duration of each fetch.
    fetch_duration: Arc<RwLock<Duration>>,
    /// Per-job duration overrides.
    job_durations: Arc<RwLock<HashMap<JobId, Duration>>>,
    /// Interrupt handles for in-flight fetches.
    interrupts: Arc<RwLock<HashMap<JobId, Arc<Notify>>>>,
    /// Optional hub to emit a progress line into at fetch start.
    progress: Option<ProgressHub>,
}

impl MockFetcher {
    /// Create a new mock fetcher with instantaneous fetches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock fetcher that emits progress events into the given hub.
    pub fn with_progress(progress: ProgressHub) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }

    /// Set the simulated duration of each fetch.
    pub async fn set_fetch_duration(&self, duration: Duration) {
        *self.fetch_duration.write().await = duration;
    }

    /// Override the simulated duration for one job. Takes effect the next
    /// time the job is fetched.
    pub async fn set_job_duration(&self, id: &JobId, duration: Duration) {
        self.job_durations.write().await.insert(id.clone(), duration);
    }

    /// Script the given job to fail with a non-zero exit.
    pub async fn fail_job(&self, id: &JobId) {
        self.failing.write().await.insert(id.clone());
    }

    /// Get all recorded fetch invocations.
    pub async fn fetched_jobs(&self) -> Vec<JobId> {
        self.fetches.read().await.iter().map(|f| f.job_id.clone()).collect()
    }

    /// Get recorded fetch invocations with timestamps.
    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    /// Number of times the given job was fetched.
    pub async fn fetch_count(&self, id: &JobId) -> usize {
        self.fetches
            .read()
            .await
            .iter()
            .filter(|f| &f.job_id == id)
            .count()
    }

    /// Get all recorded stop requests.
    pub async fn stop_requests(&self) -> Vec<JobId> {
        self.stops.read().await.clone()
    }

    /// Ids of fetches currently in flight.
    pub async fn in_flight(&self) -> Vec<JobId> {
        self.interrupts.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, job: &Job) -> Result<(), FetchError> {
        self.fetches.write().await.push(RecordedFetch {
            job_id: job.id.clone(),
            timestamp: Utc::now(),
        });

        if let Some(ref hub) = self.progress {
            hub.emit(ProgressEvent {
                job_id: job.id.clone(),
                message: format!("fetching {}", job.source_url),
            });
        }

        let interrupt = Arc::new(Notify::new());
        self.interrupts
            .write()
            .await
            .insert(job.id.clone(), Arc::clone(&interrupt));

        let duration = match self.job_durations.read().await.get(&job.id) {
            Some(duration) => *duration,
            None => *self.fetch_duration.read().await,
        };
        let interrupted = tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = interrupt.notified() => true,
        };

        self.interrupts.write().await.remove(&job.id);

        if interrupted {
            return Err(FetchError::Interrupted);
        }
        if self.failing.read().await.contains(&job.id) {
            return Err(FetchError::NonZeroExit { code: 1 });
        }
        Ok(())
    }

    async fn request_stop(&self, id: &JobId) -> Result<(), FetchError> {
        self.stops.write().await.push(id.clone());

        // Interrupt the in-flight fetch, if any; stopping a finished job
        // is a no-op.
        if let Some(interrupt) = self.interrupts.read().await.get(id) {
            interrupt.notify_one();
        }
        Ok(())
    }
}
