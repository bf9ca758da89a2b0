//! Paginated listing crawl
//!
//! A listing source has a fixed number of pages addressed by `?page=N`. One
//! task per page fetches it, extracts media references, and pushes the
//! accepted ones onto the shared queue. The stage closes the queue by
//! dropping its sender once every page task has finished.

use crate::config::ListingSource;
use crate::crawler::extractor::{extract, NodePath};
use crate::crawler::fetcher::fetch_html;
use crate::url::{has_accepted_suffix, listing_page_url, resolve_link};
use crate::{ConfigError, CrawlError, Stage};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinSet;
use url::Url;

/// One listing page to crawl
#[derive(Debug, Clone)]
pub struct PageTask {
    /// Zero-based page index
    pub index: usize,
    /// Fully built page URL
    pub url: Url,
    /// Node path selecting media references
    pub path: Arc<NodePath>,
}

/// A listing source with its URLs and node path compiled
#[derive(Debug, Clone)]
pub struct ListingPlan {
    pub name: String,
    pub base_url: Url,
    pub board_url: Url,
    pub max_page: usize,
    pub path: Arc<NodePath>,
    pub media_suffixes: Arc<Vec<String>>,
}

impl ListingPlan {
    /// Compiles a configured source
    pub fn from_source(source: &ListingSource) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&source.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base URL '{}': {}", source.base_url, e))
        })?;
        let board_url = resolve_link(&base_url, &source.board)
            .map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            name: source.name.clone(),
            base_url,
            board_url,
            max_page: source.max_page,
            path: Arc::new(NodePath::parse(&source.link_path)?),
            media_suffixes: Arc::new(source.media_suffixes.clone()),
        })
    }

    /// Returns the page tasks for `[0, max_page)`
    pub fn tasks(&self) -> Vec<PageTask> {
        (0..self.max_page)
            .map(|index| PageTask {
                index,
                url: listing_page_url(&self.board_url, index),
                path: Arc::clone(&self.path),
            })
            .collect()
    }
}

/// Crawls every page of a listing concurrently
///
/// Returns once all page tasks are done; `queue` is dropped on return, which
/// closes the channel for the drain loop when no other sender remains.
pub async fn crawl_listing(
    client: Client,
    plan: ListingPlan,
    queue: Sender<String>,
    errors: Sender<CrawlError>,
) {
    let mut pages = JoinSet::new();

    for task in plan.tasks() {
        pages.spawn(crawl_listing_page(
            client.clone(),
            task,
            Arc::clone(&plan.media_suffixes),
            queue.clone(),
            errors.clone(),
        ));
    }

    while let Some(result) = pages.join_next().await {
        if let Err(e) = result {
            tracing::error!("[{}] page task panicked: {}", plan.name, e);
        }
    }

    tracing::debug!("[{}] all {} listing pages crawled", plan.name, plan.max_page);
}

/// Fetches one listing page and forwards its accepted media references
///
/// Returns the number of references queued.
pub async fn crawl_listing_page(
    client: Client,
    task: PageTask,
    media_suffixes: Arc<Vec<String>>,
    queue: Sender<String>,
    errors: Sender<CrawlError>,
) -> usize {
    let stage = Stage::Listing { page: task.index };

    let html = match fetch_html(&client, &task.url).await {
        Ok(html) => html,
        Err(e) => {
            let _ = errors.send(CrawlError::new(stage, e)).await;
            return 0;
        }
    };

    let mut queued = 0;
    for reference in extract(&html, &task.path) {
        if !has_accepted_suffix(&reference, media_suffixes.as_slice()) {
            tracing::trace!("skipping {} on page {}", reference, task.index);
            continue;
        }
        if queue.send(reference).await.is_err() {
            break;
        }
        queued += 1;
    }

    tracing::debug!("page {} queued {} references", task.index, queued);
    queued
}
