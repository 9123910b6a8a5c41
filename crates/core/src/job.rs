//! Job description for one unit of download work.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identifier of a job, unique within a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Desired output format for a download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaFormat {
    /// Audio extracted to mp3.
    AudioOnly,
    /// Full video merged into mp4.
    #[default]
    Video,
}

impl MediaFormat {
    /// Returns the string representation for logs and status output.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFormat::AudioOnly => "audio_only",
            MediaFormat::Video => "video",
        }
    }

    /// File container the fetcher is asked to produce.
    pub fn container(&self) -> &'static str {
        match self {
            MediaFormat::AudioOnly => "mp3",
            MediaFormat::Video => "mp4",
        }
    }
}

/// One unit of acquirable work. Immutable once enqueued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Identity within the run.
    pub id: JobId,
    /// Source locator handed to the fetcher.
    pub source_url: String,
    /// Desired output format.
    pub format: MediaFormat,
    /// Destination directory for the finished file.
    pub dest_dir: PathBuf,
}

impl Job {
    pub fn new(
        id: impl Into<JobId>,
        source_url: impl Into<String>,
        format: MediaFormat,
        dest_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: id.into(),
            source_url: source_url.into(),
            format,
            dest_dir: dest_dir.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_format_as_str() {
        assert_eq!(MediaFormat::AudioOnly.as_str(), "audio_only");
        assert_eq!(MediaFormat::Video.as_str(), "video");
        assert_eq!(MediaFormat::AudioOnly.container(), "mp3");
        assert_eq!(MediaFormat::Video.container(), "mp4");
    }

    #[test]
    fn test_media_format_serialization() {
        assert_eq!(
            serde_json::to_string(&MediaFormat::AudioOnly).unwrap(),
            "\"audio_only\""
        );
        assert_eq!(serde_json::to_string(&MediaFormat::Video).unwrap(), "\"video\"");
    }

    #[test]
    fn test_job_serialization() {
        let job = Job::new("vid-1", "https://example.com/watch?v=vid-1", MediaFormat::Video, "/downloads");

        let json = serde_json::to_string(&job).unwrap();
        let parsed: Job = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.id, JobId::new("vid-1"));
        assert_eq!(parsed.source_url, "https://example.com/watch?v=vid-1");
        assert_eq!(parsed.format, MediaFormat::Video);
    }

    #[test]
    fn test_job_id_is_transparent_in_json() {
        let id = JobId::new("abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");
    }
}
