//! Download orchestrator.
//!
//! Drives a selection of jobs through the fetcher under a concurrency cap:
//! - **Queue**: jobs are offered to workers in selection order
//! - **Workers**: up to N concurrent, each serially draining the queue
//! - **Control**: pause keeps position, resume re-admits unfinished work,
//!   cancel discards the queue

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::DownloadOrchestrator;
pub use types::{OrchestratorError, RunOutcome, RunStatus, StopSignal};
