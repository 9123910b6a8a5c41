//! Broadcast hub for download progress events.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::job::JobId;

/// Default capacity of the event buffer per subscriber.
const DEFAULT_CAPACITY: usize = 256;

/// A progress line pushed by a fetcher while a job is executing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Job this event belongs to.
    pub job_id: JobId,
    /// Human-readable progress line, as produced by the fetcher backend.
    pub message: String,
}

/// Fan-out channel for [`ProgressEvent`]s.
///
/// Cheap to clone; all clones share one underlying channel. Subscribers that
/// fall behind lose the oldest events rather than blocking emitters.
#[derive(Debug, Clone)]
pub struct ProgressHub {
    tx: broadcast::Sender<ProgressEvent>,
}

impl ProgressHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Dropped silently when nobody is subscribed.
    pub fn emit(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.tx.subscribe()
    }
}

impl Default for ProgressHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Extracts a completion percentage from a fetcher progress line.
///
/// yt-dlp reports lines like `[download]  42.1% of ~5.4MiB at 2.1MiB/s`;
/// returns `None` for lines that carry no percentage.
pub fn download_percent(message: &str) -> Option<f32> {
    let re = Regex::new(r"(\d+\.?\d*)%").ok()?;
    let caps = re.captures(message)?;
    caps.get(1)?.as_str().parse::<f32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_reaches_subscriber() {
        let hub = ProgressHub::default();
        let mut rx = hub.subscribe();

        hub.emit(ProgressEvent {
            job_id: JobId::new("a"),
            message: "starting".to_string(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.job_id, JobId::new("a"));
        assert_eq!(event.message, "starting");
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_silent() {
        let hub = ProgressHub::default();
        // Must not panic or block.
        hub.emit(ProgressEvent {
            job_id: JobId::new("a"),
            message: "nobody listening".to_string(),
        });
    }

    #[tokio::test]
    async fn test_clones_share_channel() {
        let hub = ProgressHub::default();
        let mut rx = hub.subscribe();

        let clone = hub.clone();
        clone.emit(ProgressEvent {
            job_id: JobId::new("b"),
            message: "from clone".to_string(),
        });

        assert_eq!(rx.recv().await.unwrap().message, "from clone");
    }

    #[test]
    fn test_download_percent() {
        assert_eq!(
            download_percent("[download]  42.1% of ~5.4MiB at 2.1MiB/s"),
            Some(42.1)
        );
        assert_eq!(download_percent("[download] 100% of 3.2MiB"), Some(100.0));
        assert_eq!(download_percent("[ExtractAudio] Destination: x.mp3"), None);
    }
}
