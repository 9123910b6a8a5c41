//! Download orchestrator implementation.
//!
//! Owns one run at a time: a pending queue drained by up to N worker tasks,
//! an active set kept current by the progress hub, and a completed set that
//! survives pause/resume within the same logical batch.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::{broadcast, Mutex};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::fetcher::Fetcher;
use crate::job::{Job, JobId};
use crate::progress::{ProgressEvent, ProgressHub};

use super::config::OrchestratorConfig;
use super::types::{OrchestratorError, RunOutcome, RunStatus, StopSignal};

/// Live state of one orchestration run.
///
/// Guarded by a single mutex so every transition is atomic with respect to
/// concurrent worker completions and pause/cancel snapshots. A job occupies
/// at most one of `pending`, `active`, `completed`.
#[derive(Debug, Default)]
struct RunState {
    pending: VecDeque<Job>,
    active: std::collections::HashMap<JobId, String>,
    completed: std::collections::HashSet<JobId>,
    total_target: usize,
    stop_signal: StopSignal,
    outcome: Option<RunOutcome>,
    workers_alive: usize,
    message: String,
    started_at: Option<chrono::DateTime<Utc>>,
}

/// The download orchestrator - drives a selection of jobs through the
/// fetcher under a concurrency cap, with pause/resume/cancel control.
pub struct DownloadOrchestrator {
    config: OrchestratorConfig,
    fetcher: Arc<dyn Fetcher>,
    progress: ProgressHub,
    state: Arc<Mutex<RunState>>,
    /// Selection of the current logical batch, retained so a resume replays
    /// exactly what the last fresh start was given.
    selection: Mutex<Vec<Job>>,
}

impl DownloadOrchestrator {
    /// Create a new orchestrator.
    pub fn new(config: OrchestratorConfig, fetcher: Arc<dyn Fetcher>, progress: ProgressHub) -> Self {
        Self {
            config,
            fetcher,
            progress,
            state: Arc::new(Mutex::new(RunState::default())),
            selection: Mutex::new(Vec::new()),
        }
    }

    /// Start a run over the given selection.
    ///
    /// Resolves once the run ends, with its outcome. `pause` and `cancel`
    /// may be called concurrently from other tasks while this is pending.
    /// With `is_resume` the completed set is kept and already-finished jobs
    /// are filtered out; otherwise the batch starts from scratch.
    pub async fn start(
        &self,
        selection: Vec<Job>,
        concurrency_limit: usize,
        is_resume: bool,
    ) -> Result<RunOutcome, OrchestratorError> {
        if concurrency_limit == 0 {
            return Err(OrchestratorError::InvalidConcurrency);
        }

        let run_id = Uuid::new_v4();
        let worker_count = {
            let mut st = self.state.lock().await;
            if st.workers_alive > 0 {
                return Err(OrchestratorError::RunActive);
            }
            if !is_resume {
                st.completed.clear();
                st.total_target = selection.len();
            }

            let working: VecDeque<Job> = selection
                .iter()
                .filter(|job| !st.completed.contains(&job.id))
                .cloned()
                .collect();

            if working.is_empty() {
                st.pending.clear();
                st.active.clear();
                st.stop_signal = StopSignal::None;
                st.outcome = Some(RunOutcome::Complete);
                st.message = "all selected items already downloaded".to_string();
                drop(st);
                if !is_resume {
                    *self.selection.lock().await = selection;
                }
                info!("Run {} complete: nothing to download", run_id);
                return Ok(RunOutcome::Complete);
            }

            let count = working.len().min(concurrency_limit);
            st.message = if is_resume {
                format!("resuming {} items", working.len())
            } else {
                format!("downloading {} items", working.len())
            };
            st.pending = working;
            st.active.clear();
            st.stop_signal = StopSignal::None;
            st.outcome = None;
            st.workers_alive = count;
            st.started_at = Some(Utc::now());
            count
        };

        if !is_resume {
            *self.selection.lock().await = selection;
        }

        info!("Run {} started with {} workers", run_id, worker_count);

        // Run-scoped progress listener, torn down once the workers drain so
        // events from an ended run can never touch a later run's active set.
        let (listener_shutdown, _) = broadcast::channel(1);
        let listener = tokio::spawn(Self::run_progress_listener(
            self.progress.subscribe(),
            Arc::clone(&self.state),
            listener_shutdown.subscribe(),
        ));

        let mut workers = Vec::with_capacity(worker_count);
        for worker_idx in 0..worker_count {
            workers.push(tokio::spawn(Self::run_worker(
                worker_idx,
                Arc::clone(&self.fetcher),
                Arc::clone(&self.state),
            )));
        }

        for joined in join_all(workers).await {
            if let Err(e) = joined {
                error!("Worker task failed: {}", e);
            }
        }

        let _ = listener_shutdown.send(());
        let _ = listener.await;

        let mut st = self.state.lock().await;
        st.workers_alive = 0;
        let outcome = match st.stop_signal {
            StopSignal::None => {
                st.outcome = Some(RunOutcome::Complete);
                st.message = format!(
                    "{} of {} items downloaded",
                    st.completed.len(),
                    st.total_target
                );
                info!("Run {} complete", run_id);
                RunOutcome::Complete
            }
            // The pause/cancel handler is authoritative over the stop
            // outcomes; it settles `outcome` once every stop request has
            // been acknowledged or timed out.
            StopSignal::PauseRequested => RunOutcome::Paused,
            StopSignal::CancelRequested => RunOutcome::Canceled,
        };
        Ok(outcome)
    }

    /// Pause the active run.
    ///
    /// Halts new queue pulls immediately, asks the fetcher to stop every
    /// in-flight job, and leaves the queue position and completed set
    /// intact for a later [`resume`](Self::resume).
    pub async fn pause(&self) -> Result<(), OrchestratorError> {
        let active_ids: Vec<JobId> = {
            let mut st = self.state.lock().await;
            if st.workers_alive == 0 {
                return Err(OrchestratorError::NoActiveRun);
            }
            if st.stop_signal != StopSignal::None {
                return Err(OrchestratorError::AlreadyStopping);
            }
            st.stop_signal = StopSignal::PauseRequested;
            st.message = "pausing".to_string();
            st.active.keys().cloned().collect()
        };

        info!("Pause requested, stopping {} active fetches", active_ids.len());
        self.stop_active(&active_ids).await;

        let mut st = self.state.lock().await;
        st.outcome = Some(RunOutcome::Paused);
        st.message = format!("paused, {} items pending", st.pending.len());
        info!("Run paused with {} items pending", st.pending.len());
        Ok(())
    }

    /// Resume a paused batch.
    ///
    /// Re-admits only the jobs of the retained selection that never
    /// finished, including any that were active but incomplete when the
    /// pause hit.
    pub async fn resume(&self, concurrency_limit: usize) -> Result<RunOutcome, OrchestratorError> {
        {
            let st = self.state.lock().await;
            if st.outcome != Some(RunOutcome::Paused) {
                return Err(OrchestratorError::NotPaused);
            }
        }
        let selection = self.selection.lock().await.clone();
        self.start(selection, concurrency_limit, true).await
    }

    /// Cancel the active or paused run, discarding the pending queue.
    ///
    /// Unlike pause this is not resumable; a new batch must be started
    /// from a fresh selection.
    pub async fn cancel(&self) -> Result<(), OrchestratorError> {
        let active_ids: Vec<JobId> = {
            let mut st = self.state.lock().await;
            let run_active = st.workers_alive > 0;
            let paused = st.outcome == Some(RunOutcome::Paused);
            if !run_active && !paused {
                return Err(OrchestratorError::NoActiveRun);
            }
            if run_active && st.stop_signal != StopSignal::None {
                return Err(OrchestratorError::AlreadyStopping);
            }
            st.stop_signal = StopSignal::CancelRequested;
            st.pending.clear();
            st.message = "canceling".to_string();
            st.active.keys().cloned().collect()
        };

        info!("Cancel requested, stopping {} active fetches", active_ids.len());
        self.stop_active(&active_ids).await;

        let mut st = self.state.lock().await;
        st.outcome = Some(RunOutcome::Canceled);
        st.message = "canceled".to_string();
        Ok(())
    }

    /// Get a snapshot of the current run state.
    pub async fn status(&self) -> RunStatus {
        let st = self.state.lock().await;
        RunStatus {
            running: st.workers_alive > 0,
            active: st.active.clone(),
            pending: st.pending.iter().map(|job| job.id.clone()).collect(),
            completed: st.completed.clone(),
            total_target: st.total_target,
            outcome: st.outcome,
            message: st.message.clone(),
            started_at: st.started_at,
        }
    }

    /// Issue best-effort stop requests for all given jobs concurrently.
    ///
    /// Each request is bounded by the configured timeout; failures are
    /// logged and never abort the control transition.
    async fn stop_active(&self, ids: &[JobId]) {
        if ids.is_empty() {
            return;
        }

        let stop_timeout = Duration::from_millis(self.config.stop_request_timeout_ms);
        let requests = ids.iter().map(|id| {
            let fetcher = Arc::clone(&self.fetcher);
            async move {
                match timeout(stop_timeout, fetcher.request_stop(id)).await {
                    Ok(Ok(())) => debug!("Stop acknowledged for job {}", id),
                    Ok(Err(e)) => warn!("Stop request failed for job {}: {}", id, e),
                    Err(_) => warn!("Stop request timed out for job {}", id),
                }
            }
        });

        join_all(requests).await;
    }

    /// One worker: serially claims queue heads until the queue is empty or
    /// a stop is signalled. The fetch await is the sole suspension point.
    async fn run_worker(worker_idx: usize, fetcher: Arc<dyn Fetcher>, state: Arc<Mutex<RunState>>) {
        loop {
            let job = {
                let mut st = state.lock().await;
                if st.stop_signal != StopSignal::None {
                    break;
                }
                let Some(job) = st.pending.pop_front() else {
                    break;
                };
                // Claim and surface the job in one critical section so it
                // is never observable in both the queue and the active set.
                st.active.insert(job.id.clone(), "starting".to_string());
                job
            };

            debug!("Worker {} claimed job {}", worker_idx, job.id);
            let result = fetcher.fetch(&job).await;

            let mut st = state.lock().await;
            st.active.remove(&job.id);
            match result {
                Ok(()) => {
                    st.completed.insert(job.id.clone());
                    st.message = format!(
                        "{} of {} items downloaded",
                        st.completed.len(),
                        st.total_target
                    );
                    info!("Worker {} finished job {}", worker_idx, job.id);
                }
                Err(e) => {
                    // Recovered locally: the job stays out of the completed
                    // set and remains eligible for a later resume.
                    warn!("Worker {} failed job {}: {}", worker_idx, job.id, e);
                }
            }
        }

        let mut st = state.lock().await;
        st.workers_alive = st.workers_alive.saturating_sub(1);
        debug!(
            "Worker {} exited ({} still alive)",
            worker_idx, st.workers_alive
        );
    }

    /// Keeps the active set's progress lines current for one run.
    ///
    /// Events for ids outside the run's active set are ignored by
    /// construction.
    async fn run_progress_listener(
        mut events: broadcast::Receiver<ProgressEvent>,
        state: Arc<Mutex<RunState>>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                event = events.recv() => match event {
                    Ok(event) => {
                        let mut st = state.lock().await;
                        if let Some(line) = st.active.get_mut(&event.job_id) {
                            *line = event.message;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("Progress listener lagged, {} events skipped", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    }
}
