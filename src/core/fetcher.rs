//! Thumbnail download engine
//!
//! Sequential batch fetcher for max-resolution thumbnails: one request in
//! flight, a fixed per-request timeout, and per-item failures logged and
//! counted instead of aborting the run. The strictness asymmetry is
//! deliberate: loading the metadata CSV is strict, downloading is lenient.

use anyhow::Result;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::core::models::VideoRecord;
use crate::utils::file_utils::{ensure_dir_exists, extension_from_url, sanitize_filename};
use crate::utils::network;
use crate::utils::validation::is_fetchable_url;

/// Thumbnail fetcher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Directory thumbnails are saved into
    pub output_dir: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent sent with every request
    pub user_agent: String,
    /// Skip records whose target file already exists on disk
    pub skip_existing: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            output_dir: "thumbnails".to_string(),
            timeout_seconds: network::DEFAULT_TIMEOUT_SECS,
            user_agent: network::get_user_agent().to_string(),
            skip_existing: true,
        }
    }
}

/// Outcome of fetching a single thumbnail
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Downloaded(PathBuf),
    SkippedExisting(PathBuf),
    SkippedNoUrl,
}

/// Counters for one fetch run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Downloads thumbnails for batches of video records.
pub struct ThumbnailFetcher {
    config: FetcherConfig,
    client: Client,
}

impl ThumbnailFetcher {
    /// Create a fetcher with a client carrying the configured timeout and
    /// user agent.
    pub fn new(config: FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Destination path for a record's thumbnail: `<video_id>.<ext>` under
    /// the output directory, the extension taken from the URL path with a
    /// `jpg` fallback.
    pub fn thumbnail_path(&self, video: &VideoRecord) -> PathBuf {
        let extension = extension_from_url(&video.thumbnail_maxres_url).unwrap_or("jpg");
        Path::new(&self.config.output_dir).join(format!(
            "{}.{}",
            sanitize_filename(&video.video_id),
            extension
        ))
    }

    /// Fetch one record's thumbnail, streaming the body to disk.
    pub async fn fetch_one(&self, video: &VideoRecord) -> Result<FetchOutcome> {
        if video.video_id.is_empty() || !is_fetchable_url(&video.thumbnail_maxres_url) {
            return Ok(FetchOutcome::SkippedNoUrl);
        }

        let target = self.thumbnail_path(video);
        if self.config.skip_existing && target.exists() {
            return Ok(FetchOutcome::SkippedExisting(target));
        }

        let response = self
            .client
            .get(&video.thumbnail_maxres_url)
            .send()
            .await?
            .error_for_status()?;

        let mut file = File::create(&target).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(FetchOutcome::Downloaded(target))
    }

    /// Fetch thumbnails for every record, logging and counting per-item
    /// failures instead of propagating them.
    pub async fn fetch_all(&self, videos: &[VideoRecord]) -> Result<FetchSummary> {
        ensure_dir_exists(Path::new(&self.config.output_dir))?;

        let mut summary = FetchSummary::default();
        for video in videos {
            match self.fetch_one(video).await {
                Ok(FetchOutcome::Downloaded(path)) => {
                    info!(
                        "Saved thumbnail for {} to {}",
                        video.video_id,
                        path.display()
                    );
                    summary.downloaded += 1;
                }
                Ok(FetchOutcome::SkippedExisting(path)) => {
                    debug!(
                        "Thumbnail for {} already at {}, skipping",
                        video.video_id,
                        path.display()
                    );
                    summary.skipped += 1;
                }
                Ok(FetchOutcome::SkippedNoUrl) => {
                    debug!("No usable thumbnail URL for '{}', skipping", video.video_id);
                    summary.skipped += 1;
                }
                Err(error) => {
                    warn!(
                        "Failed to download thumbnail for {}: {}",
                        video.video_id, error
                    );
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}
