pub mod analyzer;
pub mod config;
pub mod fetcher;
pub mod job;
pub mod orchestrator;
pub mod progress;
pub mod testing;

pub use analyzer::{AnalyzerError, MediaItem, PlaylistAnalyzer, YtDlpAnalyzer};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DownloadsConfig,
};
pub use fetcher::{FetchError, Fetcher, FetcherConfig, YtDlpFetcher};
pub use job::{Job, JobId, MediaFormat};
pub use orchestrator::{
    DownloadOrchestrator, OrchestratorConfig, OrchestratorError, RunOutcome, RunStatus, StopSignal,
};
pub use progress::{download_percent, ProgressEvent, ProgressHub};
