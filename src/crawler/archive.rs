//! Linked archive traversal
//!
//! The archive has no page count. Its pages are discovered by following a
//! "next" anchor in the footer, one page at a time, until the chain either
//! answers 404 or links back to the seed page. Each discovered page then
//! fans out twice:
//!
//! ```text
//! traversal ──page──▶ index task ──content page──▶ image task ──asset──▶ queue
//! ```
//!
//! Content pages from every index task meet in one channel, and image tasks
//! are started from it one `image_interval` apart. Every level is tracked in
//! a `JoinSet`, so `crawl_archive` returns only after the last image task is
//! done and the asset sender can be dropped.

use crate::config::ArchiveConfig;
use crate::crawler::extractor::{extract, first, NodePath};
use crate::crawler::fetcher::{fetch, fetch_html, read_html};
use crate::state::{PageStatus, TraversalEnd, TraversalState, TraversalStep};
use crate::url::{has_accepted_suffix, resolve_link};
use crate::{ConfigError, CrawlCause, CrawlError, FetchError, ParseError, Stage};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinSet;
use url::Url;

/// An archive configuration with its URLs and node paths compiled
#[derive(Debug, Clone)]
pub struct ArchivePlan {
    pub base_url: Url,
    pub seed_url: Url,
    pub next_link: NodePath,
    pub fallback_next_link: NodePath,
    pub content_link: NodePath,
    pub image: NodePath,
    pub page_suffix: String,
    /// Pause between two "next" fetches
    pub page_interval: Duration,
    /// Pause after starting each image lookup, across the whole archive
    pub image_interval: Duration,
}

impl ArchivePlan {
    /// Compiles the archive section of the configuration
    pub fn from_config(
        config: &ArchiveConfig,
        image_interval: Duration,
    ) -> Result<Self, ConfigError> {
        let parse_url = |raw: &str| {
            Url::parse(raw)
                .map_err(|e| ConfigError::InvalidUrl(format!("Invalid archive URL '{}': {}", raw, e)))
        };

        Ok(Self {
            base_url: parse_url(&config.base_url)?,
            seed_url: parse_url(&config.seed_url)?,
            next_link: NodePath::parse(&config.next_link_path)?,
            fallback_next_link: NodePath::parse(&config.fallback_next_link_path)?,
            content_link: NodePath::parse(&config.content_link_path)?,
            image: NodePath::parse(&config.image_path)?,
            page_suffix: config.page_suffix.clone(),
            page_interval: config.page_interval(),
            image_interval,
        })
    }

    /// Finds the "next" href, trying the fallback position when the primary is absent
    fn next_href(&self, html: &str, page: &Url) -> Result<String, ParseError> {
        first(html, &self.next_link)
            .or_else(|| first(html, &self.fallback_next_link))
            .ok_or_else(|| ParseError::MissingNode {
                path: self.fallback_next_link.to_string(),
                url: page.to_string(),
            })
    }
}

/// Runs the whole archive strategy
///
/// Spawns the traversal and the index dispatcher, then starts one image
/// task per content page, pausing `image_interval` after each one. Waits for
/// every task below it and returns how the traversal ended.
pub async fn crawl_archive(
    client: Client,
    plan: Arc<ArchivePlan>,
    capacity: usize,
    assets: Sender<String>,
    errors: Sender<CrawlError>,
) -> TraversalEnd {
    let (pages_tx, pages_rx) = mpsc::channel(capacity);
    let (content_tx, mut content_rx) = mpsc::channel(capacity);

    let traversal = tokio::spawn(traverse_archive(
        client.clone(),
        Arc::clone(&plan),
        pages_tx,
        errors.clone(),
    ));
    let dispatcher = tokio::spawn(dispatch_index_pages(
        client.clone(),
        Arc::clone(&plan),
        pages_rx,
        content_tx,
        errors.clone(),
    ));

    let mut image_tasks = JoinSet::new();
    while let Some(content_page) = content_rx.recv().await {
        image_tasks.spawn(fetch_archive_image(
            client.clone(),
            Arc::clone(&plan),
            content_page,
            assets.clone(),
            errors.clone(),
        ));
        tokio::time::sleep(plan.image_interval).await;
    }

    while let Some(result) = image_tasks.join_next().await {
        if let Err(e) = result {
            tracing::error!("archive image task panicked: {}", e);
        }
    }
    if let Err(e) = dispatcher.await {
        tracing::error!("archive index dispatcher panicked: {}", e);
    }

    match traversal.await {
        Ok(end) => end,
        Err(e) => {
            tracing::error!("archive traversal panicked: {}", e);
            TraversalEnd::Failed
        }
    }
}

/// Starts one index task per discovered archive page
///
/// Returns once the page channel is closed and every index task is done,
/// dropping the last content page sender.
async fn dispatch_index_pages(
    client: Client,
    plan: Arc<ArchivePlan>,
    mut pages: Receiver<Url>,
    content: Sender<Url>,
    errors: Sender<CrawlError>,
) {
    let mut index_tasks = JoinSet::new();
    while let Some(page) = pages.recv().await {
        tracing::debug!("archive page discovered: {}", page);
        index_tasks.spawn(crawl_archive_index(
            client.clone(),
            Arc::clone(&plan),
            page,
            content.clone(),
            errors.clone(),
        ));
    }

    while let Some(result) = index_tasks.join_next().await {
        if let Err(e) = result {
            tracing::error!("archive index task panicked: {}", e);
        }
    }
}

/// Walks the "next" chain from the seed, emitting every page that answered 200
///
/// # Termination
///
/// | Condition | Result | Error reported |
/// |-----------|--------|----------------|
/// | HTTP 404 | `NotFound` | no |
/// | "next" resolves to the seed | `CycleDetected` | no |
/// | transport failure / other status | `Failed` | yes |
/// | no "next" anchor at either position | `Failed` | yes |
/// | page receiver dropped | `Closed` | no |
pub async fn traverse_archive(
    client: Client,
    plan: Arc<ArchivePlan>,
    pages: Sender<Url>,
    errors: Sender<CrawlError>,
) -> TraversalEnd {
    let mut state = TraversalState::new(plan.seed_url.clone());

    let end = loop {
        let current = state.current().clone();

        let html = match visit(&client, &current).await {
            Ok(Some(html)) => html,
            Ok(None) => break TraversalEnd::NotFound,
            Err(cause) => {
                let _ = errors
                    .send(CrawlError::new(Stage::ArchiveTraversal, cause))
                    .await;
                break TraversalEnd::Failed;
            }
        };

        if pages.send(current.clone()).await.is_err() {
            break TraversalEnd::Closed;
        }

        let next = match plan
            .next_href(&html, &current)
            .and_then(|href| resolve_link(&plan.base_url, &href))
        {
            Ok(next) => next,
            Err(e) => {
                let _ = errors
                    .send(CrawlError::new(Stage::ArchiveTraversal, e))
                    .await;
                break TraversalEnd::Failed;
            }
        };

        match state.advance(next) {
            TraversalStep::Continue(next) => {
                tracing::debug!("archive next page: {}", next);
                tokio::time::sleep(plan.page_interval).await;
            }
            TraversalStep::End(end) => break end,
        }
    };

    tracing::info!(
        "archive page proceeding from {} finished after {} pages: {}",
        state.seed(),
        state.visited(),
        end
    );
    end
}

/// Fetches one traversal step; `None` means the chain ended with a 404
async fn visit(client: &Client, url: &Url) -> Result<Option<String>, CrawlCause> {
    let response = fetch(client, url).await?;

    match PageStatus::from_status(response.status()) {
        PageStatus::Parse => Ok(Some(read_html(url, response).await?)),
        PageStatus::End => Ok(None),
        PageStatus::Fail => Err(FetchError::Status {
            url: url.to_string(),
            status: response.status(),
        }
        .into()),
    }
}

/// Extracts the content pages linked from one archive page
///
/// Returns the number of content pages forwarded.
pub async fn crawl_archive_index(
    client: Client,
    plan: Arc<ArchivePlan>,
    page: Url,
    content: Sender<Url>,
    errors: Sender<CrawlError>,
) -> usize {
    let html = match fetch_html(&client, &page).await {
        Ok(html) => html,
        Err(e) => {
            let _ = errors.send(CrawlError::new(Stage::ArchiveIndex, e)).await;
            return 0;
        }
    };

    let suffix = [plan.page_suffix.as_str()];
    let mut forwarded = 0;
    for href in extract(&html, &plan.content_link) {
        match resolve_link(&plan.base_url, &href) {
            Ok(url) if has_accepted_suffix(url.as_str(), &suffix) => {
                if content.send(url).await.is_err() {
                    break;
                }
                forwarded += 1;
            }
            Ok(url) => tracing::trace!("skipping non-page link {}", url),
            Err(e) => {
                let _ = errors.send(CrawlError::new(Stage::ArchiveIndex, e)).await;
            }
        }
    }

    forwarded
}

/// Resolves the image on one content page and forwards it as an asset
///
/// Returns true if an asset was queued.
pub async fn fetch_archive_image(
    client: Client,
    plan: Arc<ArchivePlan>,
    content_page: Url,
    assets: Sender<String>,
    errors: Sender<CrawlError>,
) -> bool {
    let image = match find_image(&client, &plan, &content_page).await {
        Ok(image) => image,
        Err(cause) => {
            let _ = errors
                .send(CrawlError::new(Stage::ArchiveImage, cause))
                .await;
            return false;
        }
    };

    assets.send(image.to_string()).await.is_ok()
}

async fn find_image(
    client: &Client,
    plan: &ArchivePlan,
    content_page: &Url,
) -> Result<Url, CrawlCause> {
    let html = fetch_html(client, content_page).await?;
    let src = first(&html, &plan.image).ok_or_else(|| ParseError::MissingNode {
        path: plan.image.to_string(),
        url: content_page.to_string(),
    })?;
    Ok(resolve_link(content_page, &src)?)
}
