//! yt-dlp backed fetcher implementation.

use std::collections::{HashMap, HashSet};
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::job::{Job, JobId, MediaFormat};
use crate::progress::{ProgressEvent, ProgressHub};

use super::config::FetcherConfig;
use super::types::{FetchError, Fetcher};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// yt-dlp based fetcher.
///
/// Spawns one yt-dlp process per job, streams its stdout lines into the
/// progress hub, and kills the child process when a stop is requested.
pub struct YtDlpFetcher {
    config: FetcherConfig,
    progress: ProgressHub,
    /// Child processes of in-flight fetches, kept for kill-on-stop.
    children: Arc<RwLock<HashMap<JobId, Child>>>,
    /// Jobs whose child was killed via a stop request, so a non-zero exit
    /// can be reported as an interruption instead of a failure.
    stopped: Arc<RwLock<HashSet<JobId>>>,
    http: reqwest::Client,
}

impl YtDlpFetcher {
    pub fn new(config: FetcherConfig, progress: ProgressHub) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .unwrap_or_default();

        Self {
            config,
            progress,
            children: Arc::new(RwLock::new(HashMap::new())),
            stopped: Arc::new(RwLock::new(HashSet::new())),
            http,
        }
    }

    /// Builds the yt-dlp argument list for one job.
    fn build_args(&self, job: &Job, url: &str) -> Vec<String> {
        let template = job.dest_dir.join("%(title)s.%(ext)s");

        let mut args = vec![
            "-o".to_string(),
            template.to_string_lossy().to_string(),
            "-N".to_string(),
            self.config.concurrent_fragments.to_string(),
            // Never overwrite files finished by an earlier run.
            "-w".to_string(),
        ];

        if let Some(ref ffmpeg) = self.config.ffmpeg_path {
            args.extend(["--ffmpeg-location".to_string(), ffmpeg.clone()]);
        }

        match job.format {
            MediaFormat::AudioOnly => {
                args.extend([
                    "-x".to_string(),
                    "--audio-format".to_string(),
                    "mp3".to_string(),
                    "--audio-quality".to_string(),
                    self.config.audio_quality.clone(),
                ]);
            }
            MediaFormat::Video => {
                args.extend([
                    "--merge-output-format".to_string(),
                    "mp4".to_string(),
                    "--postprocessor-args".to_string(),
                    "ffmpeg:-c:v copy -c:a libmp3lame".to_string(),
                ]);
            }
        }

        args.extend(self.config.extra_args.iter().cloned());
        args.push(url.to_string());

        args
    }

    /// Resolves a music.youtube.com share link to a direct watch URL.
    ///
    /// Share links redirect through pages whose final URL may not carry the
    /// video id; the id is recovered from the page body instead. Falls back
    /// to the original URL on any error.
    async fn resolve_share_link(&self, url: &str) -> String {
        let response = match self.http.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Share link resolution failed for {}: {}", url, e);
                return url.to_string();
            }
        };

        let status = response.status();
        let final_url = response.url().to_string();
        debug!("Share link {} resolved with status {}", url, status);

        if !status.is_success() {
            return final_url;
        }

        let body = response.text().await.unwrap_or_default();

        if let Some(video_id) = extract_video_id(&body, url) {
            debug!("Recovered video id {} from share page", video_id);
            return format!("https://music.youtube.com/watch?v={}", video_id);
        }

        if let Some(canonical) = extract_canonical_url(&body) {
            debug!("Using canonical URL {}", canonical);
            return canonical;
        }

        final_url
    }
}

/// Scans a page body for an embedded `videoId` value (plain or escaped),
/// skipping ids the current URL already points at.
fn extract_video_id(body: &str, current_url: &str) -> Option<String> {
    const ID_LEN: usize = 11;
    let patterns = ["\"videoId\":\"", "\\\"videoId\\\":\\\""];

    for pattern in patterns {
        let mut search_from = 0;
        while let Some(pos) = body[search_from..].find(pattern) {
            let start = search_from + pos + pattern.len();
            if start + ID_LEN <= body.len() {
                let candidate = &body[start..start + ID_LEN];
                if !candidate.contains('"')
                    && !candidate.contains('\\')
                    && !current_url.contains(candidate)
                {
                    return Some(candidate.to_string());
                }
            }
            search_from = start;
        }
    }
    None
}

/// Extracts the `<link rel="canonical">` target from a page body.
fn extract_canonical_url(body: &str) -> Option<String> {
    let marker = "link rel=\"canonical\" href=\"";
    let start = body.find(marker)? + marker.len();
    let rest = &body[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch(&self, job: &Job) -> Result<(), FetchError> {
        let url = if job.source_url.contains("music.youtube.com") {
            self.resolve_share_link(&job.source_url).await
        } else {
            job.source_url.clone()
        };

        let args = self.build_args(job, &url);
        debug!("Spawning yt-dlp for job {}: {:?}", job.id, args);

        let mut child = Command::new(&self.config.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::BinaryNotFound(self.config.ytdlp_path.clone())
                } else {
                    FetchError::Io(e)
                }
            })?;

        let stdout = child.stdout.take().expect("stdout should be captured");
        let stderr = child.stderr.take().expect("stderr should be captured");

        self.stopped.write().await.remove(&job.id);
        self.children.write().await.insert(job.id.clone(), child);

        // Surface stderr in the logs without blocking progress reads.
        let stderr_job = job.id.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("yt-dlp stderr [{}]: {}", stderr_job, line);
            }
        });

        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let message = line.trim().to_string();
            if message.is_empty() {
                continue;
            }
            self.progress.emit(ProgressEvent {
                job_id: job.id.clone(),
                message,
            });
        }

        // stdout closed: the process is exiting, reap it.
        let child = self.children.write().await.remove(&job.id);
        let was_stopped = self.stopped.write().await.remove(&job.id);

        let Some(mut child) = child else {
            return Err(FetchError::Interrupted);
        };
        let status = child.wait().await?;

        if status.success() {
            Ok(())
        } else if was_stopped {
            Err(FetchError::Interrupted)
        } else {
            Err(FetchError::NonZeroExit {
                code: status.code().unwrap_or(-1),
            })
        }
    }

    async fn request_stop(&self, id: &JobId) -> Result<(), FetchError> {
        let mut children = self.children.write().await;
        match children.get_mut(id) {
            Some(child) => {
                self.stopped.write().await.insert(id.clone());
                child
                    .start_kill()
                    .map_err(|e| FetchError::StopFailed(e.to_string()))?;
                debug!("Kill signal sent to fetch for job {}", id);
            }
            None => {
                // Already finished or never started; stop is idempotent.
                debug!("Stop requested for inactive job {}", id);
            }
        }
        Ok(())
    }
}
