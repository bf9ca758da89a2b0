//! Crawler module for page fetching, extraction, and downloading
//!
//! This module contains the harvesting pipeline, including:
//! - HTTP fetching with the configured browser User-Agent
//! - Node path extraction from HTML
//! - Paginated listing crawls and the linked archive traversal
//! - The bounded queue drain loop that throttles downloads
//! - Overall strategy coordination

mod archive;
mod coordinator;
mod downloader;
mod extractor;
mod fetcher;
mod listing;
mod queue;

pub use archive::{
    crawl_archive, crawl_archive_index, fetch_archive_image, traverse_archive, ArchivePlan,
};
pub use coordinator::{
    run_archive_strategy, run_harvest, run_listing_strategy, HarvestSummary, Harvester,
    StrategyReport,
};
pub use downloader::Downloader;
pub use extractor::{extract, first, NodePath, Nodes};
pub use fetcher::{build_http_client, fetch, fetch_html};
pub use listing::{crawl_listing, crawl_listing_page, ListingPlan, PageTask};
pub use queue::{work_channels, DrainLoop, DrainReport};

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete harvest
///
/// This is the main entry point. It will:
/// 1. Create the output directory
/// 2. Build the HTTP client
/// 3. Start every enabled listing and archive strategy
/// 4. Wait until each strategy's queue has been drained
pub async fn harvest(config: Config) -> Result<HarvestSummary, HarvestError> {
    run_harvest(config).await
}
