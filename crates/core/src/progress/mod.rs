//! Per-job progress event feed.
//!
//! Fetchers push human-readable progress lines into a [`ProgressHub`]; the
//! orchestrator subscribes per run to keep its active set current.

mod hub;

pub use hub::{download_percent, ProgressEvent, ProgressHub};
