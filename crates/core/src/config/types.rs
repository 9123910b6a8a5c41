use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetcher::FetcherConfig;
use crate::job::MediaFormat;
use crate::orchestrator::OrchestratorConfig;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub downloads: DownloadsConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Download target configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadsConfig {
    /// Directory finished files are written into.
    #[serde(default = "default_dest_dir")]
    pub dest_dir: PathBuf,

    /// Output format used when the caller specifies none.
    #[serde(default)]
    pub format: MediaFormat,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            dest_dir: default_dest_dir(),
            format: MediaFormat::default(),
        }
    }
}

fn default_dest_dir() -> PathBuf {
    PathBuf::from("downloads")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.downloads.dest_dir, PathBuf::from("downloads"));
        assert_eq!(config.downloads.format, MediaFormat::Video);
        assert_eq!(config.orchestrator.concurrency_limit, 1);
        assert_eq!(config.fetcher.ytdlp_path, "yt-dlp");
    }

    #[test]
    fn test_deserialize_sections() {
        let toml = r#"
            [downloads]
            dest_dir = "/media/incoming"
            format = "audio_only"

            [orchestrator]
            concurrency_limit = 4
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.downloads.dest_dir, PathBuf::from("/media/incoming"));
        assert_eq!(config.downloads.format, MediaFormat::AudioOnly);
        assert_eq!(config.orchestrator.concurrency_limit, 4);
    }
}
