use crate::config::types::{ArchiveConfig, Config, HttpConfig, ListingSource, QueueConfig};
use crate::crawler::NodePath;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_queue_config(&config.queue)?;
    validate_output_config(&config.output)?;
    validate_listings(&config.listings)?;
    if config.archive.enabled {
        validate_archive_config(&config.archive)?;
    }
    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_queue_config(config: &QueueConfig) -> Result<(), ConfigError> {
    // A zero-capacity tokio channel panics on construction
    if config.capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "queue capacity must be >= 1, got {}",
            config.capacity
        )));
    }
    Ok(())
}

fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates every listing source, including disabled ones
fn validate_listings(listings: &[ListingSource]) -> Result<(), ConfigError> {
    for source in listings {
        if source.name.is_empty() {
            return Err(ConfigError::Validation(
                "listing name cannot be empty".to_string(),
            ));
        }

        validate_base_url(&source.base_url)?;

        if source.board.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Listing '{}' must name a board",
                source.name
            )));
        }

        NodePath::parse(&source.link_path)?;

        if source.media_suffixes.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Listing '{}' must accept at least one media suffix",
                source.name
            )));
        }
        for suffix in &source.media_suffixes {
            validate_suffix(suffix)?;
        }
    }
    Ok(())
}

fn validate_archive_config(config: &ArchiveConfig) -> Result<(), ConfigError> {
    validate_base_url(&config.base_url)?;

    Url::parse(&config.seed_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", config.seed_url, e))
    })?;

    NodePath::parse(&config.next_link_path)?;
    NodePath::parse(&config.fallback_next_link_path)?;
    NodePath::parse(&config.content_link_path)?;
    NodePath::parse(&config.image_path)?;

    validate_suffix(&config.page_suffix)?;
    Ok(())
}

/// Base URLs are joined against, so they must name a directory
fn validate_base_url(base: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base URL '{}': {}", base, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Base URL '{}' must use http or https",
            base
        )));
    }

    if !url.path().ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "Base URL '{}' must end with '/'",
            base
        )));
    }

    Ok(())
}

fn validate_suffix(suffix: &str) -> Result<(), ConfigError> {
    if suffix.len() < 2 || !suffix.starts_with('.') {
        return Err(ConfigError::Validation(format!(
            "Suffix '{}' must be a dot followed by an extension",
            suffix
        )));
    }
    Ok(())
}
