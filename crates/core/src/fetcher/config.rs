//! Fetcher configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the yt-dlp fetcher backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Path to the yt-dlp binary.
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,

    /// Path passed through to yt-dlp via `--ffmpeg-location`.
    /// When unset, yt-dlp resolves ffmpeg from PATH.
    #[serde(default)]
    pub ffmpeg_path: Option<String>,

    /// Number of parallel fragment connections per download (`-N`).
    #[serde(default = "default_fragments")]
    pub concurrent_fragments: u32,

    /// Audio bitrate requested for audio-only downloads.
    #[serde(default = "default_audio_quality")]
    pub audio_quality: String,

    /// Extra arguments appended to every yt-dlp invocation.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_fragments() -> u32 {
    8
}

fn default_audio_quality() -> String {
    "320K".to_string()
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            ffmpeg_path: None,
            concurrent_fragments: default_fragments(),
            audio_quality: default_audio_quality(),
            extra_args: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FetcherConfig::default();
        assert_eq!(config.ytdlp_path, "yt-dlp");
        assert_eq!(config.ffmpeg_path, None);
        assert_eq!(config.concurrent_fragments, 8);
        assert_eq!(config.audio_quality, "320K");
        assert!(config.extra_args.is_empty());
    }

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            ytdlp_path = "/opt/bin/yt-dlp"
        "#;
        let config: FetcherConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.ytdlp_path, "/opt/bin/yt-dlp");
        assert_eq!(config.concurrent_fragments, 8);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            ytdlp_path = "yt-dlp"
            ffmpeg_path = "/usr/lib/ffmpeg"
            concurrent_fragments = 4
            audio_quality = "192K"
            extra_args = ["-w"]
        "#;
        let config: FetcherConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.ffmpeg_path.as_deref(), Some("/usr/lib/ffmpeg"));
        assert_eq!(config.concurrent_fragments, 4);
        assert_eq!(config.audio_quality, "192K");
        assert_eq!(config.extra_args, vec!["-w".to_string()]);
    }
}
