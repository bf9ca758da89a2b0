//! BBS-Harvest: a throttled media harvester for paginated boards and linked archives
//!
//! This crate crawls a handful of listing pages concurrently, funnels every
//! discovered media reference into a bounded queue, and drains that queue
//! through a single rate-limited downloader per strategy.

pub mod config;
pub mod crawler;
pub mod state;
pub mod url;

use reqwest::StatusCode;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that stop a harvest before or while it starts
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid node path in config: {0}")]
    InvalidPath(#[from] ParseError),
}

/// Transport failures and unexpected HTTP statuses
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("HTTP status error on {url}: {status}")]
    Status { url: String, status: StatusCode },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

/// Markup and link resolution failures
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid node path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    #[error("No node matches '{path}' in {url}")]
    MissingNode { path: String, url: String },

    #[error("Cannot resolve '{href}' against {base}: {source}")]
    InvalidUrl {
        href: String,
        base: String,
        source: ::url::ParseError,
    },
}

/// Failures while persisting a single asset
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Cannot derive a file name from {url}")]
    MissingFileName { url: String },

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The pipeline step a crawl error was raised in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// A paginated listing page, by zero-based index
    Listing { page: usize },
    /// The "next page" walk over the archive
    ArchiveTraversal,
    /// Content-link extraction on one archive page
    ArchiveIndex,
    /// Image lookup on one content page
    ArchiveImage,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listing { page } => write!(f, "listing page {}", page),
            Self::ArchiveTraversal => write!(f, "archive traversal"),
            Self::ArchiveIndex => write!(f, "archive index"),
            Self::ArchiveImage => write!(f, "archive image"),
        }
    }
}

/// Underlying reason for a crawl error
#[derive(Debug, Error)]
pub enum CrawlCause {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A recoverable failure reported on a strategy's error channel
#[derive(Debug, Error)]
#[error("[{stage}] {cause}")]
pub struct CrawlError {
    pub stage: Stage,
    #[source]
    pub cause: CrawlCause,
}

impl CrawlError {
    pub fn new(stage: Stage, cause: impl Into<CrawlCause>) -> Self {
        Self {
            stage,
            cause: cause.into(),
        }
    }
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Harvester, HarvestSummary};
pub use state::TraversalEnd;
