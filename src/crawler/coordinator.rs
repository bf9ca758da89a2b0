//! Harvest coordinator - starts every strategy and waits for all of them
//!
//! A strategy is one producer stage wired to its own bounded queue, error
//! channel, and drain loop:
//!
//! - one listing strategy per enabled `[[listing]]` source
//! - one archive strategy if `[archive]` is enabled
//!
//! Strategies run concurrently and share only the HTTP client and the
//! output directory.

use crate::config::{validate, Config};
use crate::crawler::archive::{crawl_archive, ArchivePlan};
use crate::crawler::downloader::Downloader;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::listing::{crawl_listing, ListingPlan};
use crate::crawler::queue::{work_channels, DrainLoop, DrainReport};
use crate::state::TraversalEnd;
use crate::HarvestError;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Outcome of one strategy
#[derive(Debug, Clone)]
pub struct StrategyReport {
    /// Listing source name, or `archive`
    pub name: String,

    /// What the strategy's drain loop saw
    pub drain: DrainReport,

    /// How the archive walk ended (archive strategy only)
    pub traversal: Option<TraversalEnd>,
}

/// Outcome of a whole harvest
#[derive(Debug, Clone, Default)]
pub struct HarvestSummary {
    pub strategies: Vec<StrategyReport>,
}

impl HarvestSummary {
    /// Total number of files written
    pub fn downloaded(&self) -> usize {
        self.strategies.iter().map(|s| s.drain.downloaded.len()).sum()
    }

    /// Total number of failed downloads
    pub fn failed(&self) -> usize {
        self.strategies.iter().map(|s| s.drain.failed.len()).sum()
    }

    /// Total number of crawl errors logged
    pub fn errors(&self) -> usize {
        self.strategies.iter().map(|s| s.drain.errors).sum()
    }

    /// Looks up a strategy by name
    pub fn strategy(&self, name: &str) -> Option<&StrategyReport> {
        self.strategies.iter().find(|s| s.name == name)
    }
}

/// Main harvester structure
pub struct Harvester {
    config: Arc<Config>,
    client: Client,
    downloader: Downloader,
}

impl Harvester {
    /// Creates a harvester, creating the output directory if needed
    ///
    /// The configuration is validated here as well, so a `Config` built in
    /// code gets the same checks as one loaded from a file.
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError::Config)` - The configuration is invalid
    /// * `Err(HarvestError::OutputDir)` - The output directory cannot be created
    /// * `Err(HarvestError::Client)` - The HTTP client cannot be built
    pub async fn new(config: Config) -> Result<Self, HarvestError> {
        validate(&config)?;

        let target_dir = PathBuf::from(&config.output.directory);
        tokio::fs::create_dir_all(&target_dir)
            .await
            .map_err(|source| HarvestError::OutputDir {
                path: target_dir.clone(),
                source,
            })?;

        let client = build_http_client(&config.http)?;
        let downloader = Downloader::new(client.clone(), target_dir);

        Ok(Self {
            config: Arc::new(config),
            client,
            downloader,
        })
    }

    pub fn target_dir(&self) -> &Path {
        self.downloader.target_dir()
    }

    /// Runs every enabled strategy to completion
    ///
    /// Individual page or download failures never fail the run; they are
    /// logged and counted in the returned summary. A strategy task that
    /// panics is logged and left out of the summary while the others finish.
    pub async fn run(&self) -> Result<HarvestSummary, HarvestError> {
        let capacity = self.config.queue.capacity;
        let interval = self.config.queue.download_interval();

        // Compile everything first so a bad source fails before any request
        let listings = self
            .config
            .listings
            .iter()
            .filter(|source| source.enabled)
            .map(ListingPlan::from_source)
            .collect::<Result<Vec<_>, _>>()?;
        let archive = if self.config.archive.enabled {
            Some(Arc::new(ArchivePlan::from_config(
                &self.config.archive,
                interval,
            )?))
        } else {
            None
        };

        tracing::info!("*** target save dir -> {}", self.target_dir().display());
        tracing::info!("*** start crawling");

        let mut strategies = JoinSet::new();
        for plan in listings {
            strategies.spawn(run_listing_strategy(
                self.client.clone(),
                plan,
                capacity,
                interval,
                self.downloader.clone(),
            ));
        }
        if let Some(plan) = archive {
            strategies.spawn(run_archive_strategy(
                self.client.clone(),
                plan,
                capacity,
                interval,
                self.downloader.clone(),
            ));
        }

        let mut summary = HarvestSummary::default();
        while let Some(result) = strategies.join_next().await {
            let report = match result {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!("strategy task failed: {}", e);
                    continue;
                }
            };
            tracing::info!(
                "strategy {} done: {} of {} downloaded",
                report.name,
                report.drain.downloaded.len(),
                report.drain.attempted()
            );
            summary.strategies.push(report);
        }

        tracing::info!("*** finished crawling");
        Ok(summary)
    }
}

/// Crawls one listing source into its own drain loop
pub async fn run_listing_strategy(
    client: Client,
    plan: ListingPlan,
    capacity: usize,
    interval: Duration,
    downloader: Downloader,
) -> StrategyReport {
    let name = plan.name.clone();
    let ((queue_tx, queue_rx), (err_tx, err_rx)) = work_channels(capacity);
    let drain = DrainLoop::new(name.clone(), plan.base_url.clone(), downloader, interval);

    let crawl = tokio::spawn(crawl_listing(client, plan, queue_tx, err_tx));
    let report = drain.run(queue_rx, err_rx).await;
    if let Err(e) = crawl.await {
        tracing::error!("[{}] listing crawl panicked: {}", name, e);
    }

    StrategyReport {
        name,
        drain: report,
        traversal: None,
    }
}

/// Walks the archive into its own drain loop
pub async fn run_archive_strategy(
    client: Client,
    plan: Arc<ArchivePlan>,
    capacity: usize,
    interval: Duration,
    downloader: Downloader,
) -> StrategyReport {
    let name = "archive".to_string();
    let ((assets_tx, assets_rx), (err_tx, err_rx)) = work_channels(capacity);
    let drain = DrainLoop::new(name.clone(), plan.base_url.clone(), downloader, interval);

    let crawl = tokio::spawn(crawl_archive(client, plan, capacity, assets_tx, err_tx));
    let report = drain.run(assets_rx, err_rx).await;
    let traversal = match crawl.await {
        Ok(end) => end,
        Err(e) => {
            tracing::error!("[{}] archive crawl panicked: {}", name, e);
            TraversalEnd::Failed
        }
    };
    if !traversal.is_clean() {
        tracing::warn!("[{}] archive walk stopped early: {}", name, traversal);
    }

    StrategyReport {
        name,
        drain: report,
        traversal: Some(traversal),
    }
}

/// Runs a complete harvest
///
/// # Example
///
/// ```no_run
/// use bbs_harvest::config::Config;
/// use bbs_harvest::crawler::run_harvest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = run_harvest(Config::default()).await?;
/// println!("{} files saved", summary.downloaded());
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: Config) -> Result<HarvestSummary, HarvestError> {
    let harvester = Harvester::new(config).await?;
    harvester.run().await
}
