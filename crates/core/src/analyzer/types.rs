//! Types for playlist analysis.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while analyzing a playlist URL.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Analyzer binary not found: {0}")]
    BinaryNotFound(String),

    #[error("Playlist dump failed: {0}")]
    CommandFailed(String),

    #[error("Failed to parse playlist dump: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One enumerated media item the user can select for download.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    /// Source-assigned item id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Direct watch URL for the item.
    pub url: String,
    /// Thumbnail URL, when the dump carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Duration in seconds, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
}

/// Trait for playlist enumeration backends.
#[async_trait]
pub trait PlaylistAnalyzer: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Enumerate a source URL into acquirable items.
    ///
    /// A URL pointing at a single item yields a one-element list.
    async fn analyze(&self, url: &str) -> Result<Vec<MediaItem>, AnalyzerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_item_serialization() {
        let item = MediaItem {
            id: "vid-1".to_string(),
            title: "Some Song".to_string(),
            url: "https://www.youtube.com/watch?v=vid-1".to_string(),
            thumbnail: None,
            duration_secs: Some(213),
        };

        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("thumbnail"));

        let parsed: MediaItem = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, "vid-1");
        assert_eq!(parsed.duration_secs, Some(213));
    }

    #[test]
    fn test_error_display() {
        let err = AnalyzerError::CommandFailed("boom".to_string());
        assert_eq!(err.to_string(), "Playlist dump failed: boom");
    }
}
