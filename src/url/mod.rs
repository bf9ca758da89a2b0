//! URL handling module for BBS-Harvest
//!
//! This module provides link resolution, listing page addressing, exact
//! suffix matching, and file name derivation for downloaded assets.

mod file_name;
mod matcher;
mod resolve;

// Re-export main functions
pub use file_name::file_name;
pub use matcher::has_accepted_suffix;
pub use resolve::{listing_page_url, resolve_link};
