use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grabbit_core::{
    download_percent, load_config, validate_config, Config, DownloadOrchestrator, Fetcher, Job,
    JobId, MediaFormat, PlaylistAnalyzer, ProgressHub, RunOutcome, YtDlpAnalyzer, YtDlpFetcher,
};

/// Batch media downloader driven by yt-dlp.
#[derive(Debug, Parser)]
#[command(name = "grabbit", version, about)]
struct Cli {
    /// Playlist or video URL to analyze and download.
    url: String,

    /// Download audio only (mp3) instead of full video.
    #[arg(long)]
    audio: bool,

    /// Destination directory override.
    #[arg(long)]
    dest: Option<PathBuf>,

    /// Concurrent download cap override.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Config file path.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration; a missing file just means defaults.
    let mut config = if cli.config.exists() {
        info!("Loading configuration from {:?}", cli.config);
        load_config(&cli.config)
            .with_context(|| format!("Failed to load config from {:?}", cli.config))?
    } else {
        info!("No config file at {:?}, using defaults", cli.config);
        Config::default()
    };

    if let Some(dest) = cli.dest {
        config.downloads.dest_dir = dest;
    }
    if cli.audio {
        config.downloads.format = MediaFormat::AudioOnly;
    }
    if let Some(limit) = cli.concurrency {
        config.orchestrator.concurrency_limit = limit;
    }

    validate_config(&config).context("Configuration validation failed")?;

    // Enumerate the URL into acquirable items.
    let analyzer = YtDlpAnalyzer::new(config.fetcher.ytdlp_path.clone());
    info!("Analyzing {}", cli.url);
    let items = analyzer
        .analyze(&cli.url)
        .await
        .context("Playlist analysis failed")?;
    info!("Found {} items", items.len());

    // The CLI selects everything the analyzer found.
    let jobs: Vec<Job> = items
        .iter()
        .map(|item| {
            Job::new(
                JobId::new(item.id.clone()),
                item.url.clone(),
                config.downloads.format,
                config.downloads.dest_dir.clone(),
            )
        })
        .collect();

    let progress = ProgressHub::default();
    let fetcher: Arc<dyn Fetcher> =
        Arc::new(YtDlpFetcher::new(config.fetcher.clone(), progress.clone()));
    let orchestrator = Arc::new(DownloadOrchestrator::new(
        config.orchestrator.clone(),
        fetcher,
        progress.clone(),
    ));

    // Echo progress while the run executes.
    let mut events = progress.subscribe();
    let echo = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match download_percent(&event.message) {
                Some(percent) => info!("[{}] {:.1}%", event.job_id, percent),
                None => debug!("[{}] {}", event.job_id, event.message),
            }
        }
    });

    let concurrency = config.orchestrator.concurrency_limit;
    info!(
        "Starting download of {} items ({} concurrent)",
        jobs.len(),
        concurrency
    );

    let mut run_handle = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.start(jobs, concurrency, false).await })
    };

    let outcome = tokio::select! {
        joined = &mut run_handle => joined.context("Run task failed")??,
        _ = signal::ctrl_c() => {
            warn!("Interrupt received, canceling run");
            if let Err(e) = orchestrator.cancel().await {
                warn!("Cancel failed: {}", e);
            }
            run_handle.await.context("Run task failed")??
        }
    };

    let status = orchestrator.status().await;
    match outcome {
        RunOutcome::Complete => info!(
            "Done: {} of {} items downloaded",
            status.completed.len(),
            status.total_target
        ),
        RunOutcome::Paused => info!("Run paused: {}", status.message),
        RunOutcome::Canceled => warn!(
            "Run canceled, {} items had completed",
            status.completed.len()
        ),
    }

    echo.abort();
    Ok(())
}
