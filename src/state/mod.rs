//! State module for the archive traversal
//!
//! # Components
//!
//! - `TraversalState`: the page currently visited and the seed it must not return to
//! - `PageStatus`: how a page's HTTP status steers the walk
//! - `TraversalEnd`: why a walk stopped

mod traversal;

// Re-export main types
pub use traversal::{PageStatus, TraversalEnd, TraversalState, TraversalStep};
