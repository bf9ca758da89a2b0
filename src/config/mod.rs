//! Configuration module for BBS-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; an empty file yields the built-in sources.
//!
//! # Example
//!
//! ```no_run
//! use bbs_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Queue capacity: {}", config.queue.capacity);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ArchiveConfig, Config, HttpConfig, ListingSource, OutputConfig, QueueConfig,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
