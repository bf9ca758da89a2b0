//! Bounded work queue drain loop
//!
//! Each strategy funnels its discovered asset references into one bounded
//! channel and its failures into another. A single `DrainLoop` consumes both:
//!
//! - an asset is resolved, downloaded, and followed by a fixed pause, which
//!   is the only download throttle in the pipeline;
//! - an error is logged and counted.
//!
//! The loop ends when the asset channel is closed and empty. Errors still in
//! flight at that point are dropped.

use crate::crawler::downloader::Downloader;
use crate::url::resolve_link;
use crate::CrawlError;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::{self, Receiver, Sender};
use url::Url;

/// Creates the bounded asset queue and its error channel
pub fn work_channels(
    capacity: usize,
) -> (
    (Sender<String>, Receiver<String>),
    (Sender<CrawlError>, Receiver<CrawlError>),
) {
    (mpsc::channel(capacity), mpsc::channel(capacity))
}

/// What one drain loop observed
#[derive(Debug, Clone, Default)]
pub struct DrainReport {
    /// Files written, in download order
    pub downloaded: Vec<PathBuf>,

    /// Asset references whose download failed
    pub failed: Vec<String>,

    /// Crawl errors received on the error channel
    pub errors: usize,
}

impl DrainReport {
    /// Total number of asset references dequeued
    pub fn attempted(&self) -> usize {
        self.downloaded.len() + self.failed.len()
    }
}

/// Single consumer between the crawl tasks and the network egress
#[derive(Debug, Clone)]
pub struct DrainLoop {
    label: String,
    base: Url,
    downloader: Downloader,
    interval: Duration,
}

impl DrainLoop {
    /// Creates a drain loop
    ///
    /// # Arguments
    ///
    /// * `label` - Strategy name used in logs
    /// * `base` - URL relative asset references are resolved against
    /// * `downloader` - Where assets end up
    /// * `interval` - Pause after every dequeued asset
    pub fn new(
        label: impl Into<String>,
        base: Url,
        downloader: Downloader,
        interval: Duration,
    ) -> Self {
        Self {
            label: label.into(),
            base,
            downloader,
            interval,
        }
    }

    /// Drains `assets` until every producer has dropped its sender
    pub async fn run(
        &self,
        mut assets: Receiver<String>,
        mut errors: Receiver<CrawlError>,
    ) -> DrainReport {
        let mut report = DrainReport::default();
        let mut errors_open = true;

        loop {
            tokio::select! {
                asset = assets.recv() => {
                    let Some(reference) = asset else {
                        break;
                    };
                    self.handle_asset(reference, &mut report).await;
                    tokio::time::sleep(self.interval).await;
                }
                error = errors.recv(), if errors_open => {
                    match error {
                        Some(error) => {
                            tracing::warn!("[{}] {}", self.label, error);
                            report.errors += 1;
                        }
                        None => errors_open = false,
                    }
                }
            }
        }

        tracing::info!(
            "[{}] queue drained: {} downloaded, {} failed, {} crawl errors",
            self.label,
            report.downloaded.len(),
            report.failed.len(),
            report.errors
        );

        report
    }

    async fn handle_asset(&self, reference: String, report: &mut DrainReport) {
        let url = match resolve_link(&self.base, &reference) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("[{}] {}", self.label, e);
                report.failed.push(reference);
                return;
            }
        };

        tracing::info!("[{}] Downloading {}", self.label, url);
        match self.downloader.download(&url).await {
            Ok(path) => {
                tracing::debug!("[{}] Saved {}", self.label, path.display());
                report.downloaded.push(path);
            }
            Err(e) => {
                tracing::error!("[{}] Download of {} failed: {}", self.label, url, e);
                report.failed.push(reference);
            }
        }
    }
}
