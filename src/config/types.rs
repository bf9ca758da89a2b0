use serde::Deserialize;
use std::time::Duration;

/// Desktop browser string the boards expect (Chrome 39 on macOS)
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_9_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/39.0.2171.95 Safari/537.36";

/// Main configuration structure for BBS-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default = "default_listings", rename = "listing")]
    pub listings: Vec<ListingSource>,
    #[serde(default)]
    pub archive: ArchiveConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            queue: QueueConfig::default(),
            output: OutputConfig::default(),
            listings: default_listings(),
            archive: ArchiveConfig::default(),
        }
    }
}

/// HTTP identification
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Value of the User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

/// Work queue sizing and download throttle
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Capacity of every bounded channel in the pipeline
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Pause after each dequeued download (milliseconds)
    #[serde(rename = "download-interval-ms", default = "default_download_interval")]
    pub download_interval_ms: u64,
}

impl QueueConfig {
    pub fn download_interval(&self) -> Duration {
        Duration::from_millis(self.download_interval_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            download_interval_ms: default_download_interval(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives every downloaded asset
    #[serde(default = "default_directory")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}

/// A board whose listing pages are addressed by `?page=N`
#[derive(Debug, Clone, Deserialize)]
pub struct ListingSource {
    /// Label used in logs
    pub name: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory URL the board and its media live under (must end with '/')
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Board script relative to `base_url`
    #[serde(default = "default_board")]
    pub board: String,

    /// Number of listing pages to crawl
    #[serde(rename = "max-page")]
    pub max_page: usize,

    /// Node path selecting media references on a listing page
    #[serde(rename = "link-path", default = "default_link_path")]
    pub link_path: String,

    /// Accepted media suffixes, matched exactly and case-sensitively
    #[serde(rename = "media-suffixes", default = "default_media_suffixes")]
    pub media_suffixes: Vec<String>,
}

impl ListingSource {
    pub fn new(name: &str, base_url: &str, max_page: usize) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            base_url: base_url.to_string(),
            board: default_board(),
            max_page,
            link_path: default_link_path(),
            media_suffixes: default_media_suffixes(),
        }
    }
}

/// A chain of archive pages linked by a "next" anchor
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory URL archive links are resolved against (must end with '/')
    #[serde(rename = "base-url", default = "default_archive_base")]
    pub base_url: String,

    /// First archive page; a "next" link back to it ends the walk
    #[serde(rename = "seed-url", default = "default_archive_seed")]
    pub seed_url: String,

    #[serde(rename = "next-link-path", default = "default_next_link_path")]
    pub next_link_path: String,

    /// Used when `next_link_path` matches nothing (last page has one anchor fewer)
    #[serde(
        rename = "fallback-next-link-path",
        default = "default_fallback_next_link_path"
    )]
    pub fallback_next_link_path: String,

    #[serde(rename = "content-link-path", default = "default_content_link_path")]
    pub content_link_path: String,

    #[serde(rename = "image-path", default = "default_image_path")]
    pub image_path: String,

    /// Suffix a content link must carry to be followed
    #[serde(rename = "page-suffix", default = "default_page_suffix")]
    pub page_suffix: String,

    /// Pause between two "next" fetches (milliseconds)
    #[serde(rename = "page-interval-ms", default = "default_page_interval")]
    pub page_interval_ms: u64,
}

impl ArchiveConfig {
    pub fn page_interval(&self) -> Duration {
        Duration::from_millis(self.page_interval_ms)
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_archive_base(),
            seed_url: default_archive_seed(),
            next_link_path: default_next_link_path(),
            fallback_next_link_path: default_fallback_next_link_path(),
            content_link_path: default_content_link_path(),
            image_path: default_image_path(),
            page_suffix: default_page_suffix(),
            page_interval_ms: default_page_interval(),
        }
    }
}

fn default_listings() -> Vec<ListingSource> {
    vec![
        ListingSource::new(
            "new-contents",
            "http://www.netriver.jp/rbs/usr/himanayaro/",
            8,
        ),
        ListingSource::new("old-contents", "http://www.netriver.jp/rbs/usr/umoo/", 3),
    ]
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_capacity() -> usize {
    100
}

fn default_download_interval() -> u64 {
    3000
}

fn default_directory() -> String {
    "images".to_string()
}

fn default_true() -> bool {
    true
}

fn default_board() -> String {
    "rivbb.cgi".to_string()
}

fn default_link_path() -> String {
    "tbody a@href".to_string()
}

fn default_media_suffixes() -> Vec<String> {
    vec![".png".to_string(), ".jpg".to_string()]
}

fn default_archive_base() -> String {
    "http://baka.bakufu.org/kobokora/mee/".to_string()
}

fn default_archive_seed() -> String {
    "http://baka.bakufu.org/kobokora/mee/index.html".to_string()
}

fn default_next_link_path() -> String {
    "div#foot > a:nth-of-type(3)@href".to_string()
}

fn default_fallback_next_link_path() -> String {
    "div#foot > a:nth-of-type(2)@href".to_string()
}

fn default_content_link_path() -> String {
    "div#rightcol > a@href".to_string()
}

fn default_image_path() -> String {
    "div#rightcol > img@src".to_string()
}

fn default_page_suffix() -> String {
    ".html".to_string()
}

fn default_page_interval() -> u64 {
    1000
}
