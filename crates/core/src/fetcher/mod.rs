//! Item fetcher abstraction.
//!
//! This module provides a `Fetcher` trait for performing one download job at
//! a time, with out-of-band stop support, plus the yt-dlp backed
//! implementation.

mod config;
mod types;
mod ytdlp;

pub use config::FetcherConfig;
pub use types::{FetchError, Fetcher};
pub use ytdlp::YtDlpFetcher;
