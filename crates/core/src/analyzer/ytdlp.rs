//! yt-dlp backed playlist analyzer.

use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use super::types::{AnalyzerError, MediaItem, PlaylistAnalyzer};

/// Playlist analyzer that shells out to `yt-dlp --flat-playlist`.
pub struct YtDlpAnalyzer {
    ytdlp_path: String,
}

impl YtDlpAnalyzer {
    pub fn new(ytdlp_path: impl Into<String>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
        }
    }
}

#[async_trait]
impl PlaylistAnalyzer for YtDlpAnalyzer {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn analyze(&self, url: &str) -> Result<Vec<MediaItem>, AnalyzerError> {
        debug!("Dumping playlist metadata for {}", url);

        let output = Command::new(&self.ytdlp_path)
            .args(["--flat-playlist", "--dump-single-json", url])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AnalyzerError::BinaryNotFound(self.ytdlp_path.clone())
                } else {
                    AnalyzerError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalyzerError::CommandFailed(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: Value = serde_json::from_str(&stdout)
            .map_err(|e| AnalyzerError::ParseError(e.to_string()))?;

        Ok(parse_dump(url, &json))
    }
}

/// Parses a yt-dlp single-json dump into media items.
///
/// Playlists carry an `entries` array; a plain video URL dumps the video
/// object directly.
fn parse_dump(url: &str, json: &Value) -> Vec<MediaItem> {
    let Some(entries) = json.get("entries").and_then(|e| e.as_array()) else {
        return vec![parse_single_video(url, json)];
    };

    entries
        .iter()
        .map(|entry| {
            let id = entry["id"].as_str().unwrap_or_default().to_string();
            let title = entry["title"].as_str().unwrap_or_default().to_string();
            let entry_url = entry["url"].as_str().unwrap_or_default().to_string();
            let duration_secs = entry.get("duration").and_then(|d| d.as_u64());

            // Flat dumps may omit thumbnails for some entries.
            let thumbnail = entry
                .get("thumbnails")
                .and_then(|t| t.as_array())
                .and_then(|t| t.first())
                .and_then(|t| t["url"].as_str())
                .map(|s| s.to_string());

            // Some entries carry a bare id instead of a URL. Music-domain
            // playlists already resolve to the right domain in entry_url.
            let full_url = if url.contains("music.youtube.com") || entry_url.starts_with("http") {
                entry_url
            } else {
                format!("https://www.youtube.com/watch?v={}", id)
            };

            MediaItem {
                id,
                title,
                url: full_url,
                thumbnail,
                duration_secs,
            }
        })
        .collect()
}

fn parse_single_video(url: &str, json: &Value) -> MediaItem {
    MediaItem {
        id: json["id"].as_str().unwrap_or_default().to_string(),
        title: json["title"].as_str().unwrap_or_default().to_string(),
        url: json["webpage_url"].as_str().unwrap_or(url).to_string(),
        thumbnail: json
            .get("thumbnail")
            .and_then(|t| t.as_str())
            .map(|s| s.to_string()),
        duration_secs: json.get("duration").and_then(|d| d.as_u64()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_playlist_entries() {
        let dump = json!({
            "entries": [
                {
                    "id": "aaa11111111",
                    "title": "First",
                    "url": "https://www.youtube.com/watch?v=aaa11111111",
                    "duration": 180,
                    "thumbnails": [{"url": "https://img.example/a.jpg"}]
                },
                {
                    "id": "bbb22222222",
                    "title": "Second",
                    "url": "",
                    "duration": null
                }
            ]
        });

        let items = parse_dump("https://www.youtube.com/playlist?list=x", &dump);
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].id, "aaa11111111");
        assert_eq!(items[0].duration_secs, Some(180));
        assert_eq!(items[0].thumbnail.as_deref(), Some("https://img.example/a.jpg"));

        // Bare id entry gets a constructed watch URL.
        assert_eq!(items[1].url, "https://www.youtube.com/watch?v=bbb22222222");
        assert_eq!(items[1].duration_secs, None);
    }

    #[test]
    fn test_parse_music_playlist_keeps_entry_urls() {
        let dump = json!({
            "entries": [
                {
                    "id": "ccc33333333",
                    "title": "Track",
                    "url": "https://music.youtube.com/watch?v=ccc33333333"
                }
            ]
        });

        let items = parse_dump("https://music.youtube.com/playlist?list=y", &dump);
        assert_eq!(items[0].url, "https://music.youtube.com/watch?v=ccc33333333");
    }

    #[test]
    fn test_parse_single_video_fallback() {
        let dump = json!({
            "id": "ddd44444444",
            "title": "Lone Video",
            "webpage_url": "https://www.youtube.com/watch?v=ddd44444444",
            "thumbnail": "https://img.example/d.jpg",
            "duration": 95
        });

        let items = parse_dump("https://youtu.be/ddd44444444", &dump);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Lone Video");
        assert_eq!(items[0].url, "https://www.youtube.com/watch?v=ddd44444444");
        assert_eq!(items[0].duration_secs, Some(95));
    }

    #[test]
    fn test_parse_single_video_without_webpage_url_uses_input() {
        let dump = json!({"id": "eee55555555", "title": "No URL"});
        let items = parse_dump("https://youtu.be/eee55555555", &dump);
        assert_eq!(items[0].url, "https://youtu.be/eee55555555");
    }
}
