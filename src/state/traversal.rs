//! Traversal state for the archive "next page" walk
//!
//! The walk is a single-state machine ("at current page"). This module holds
//! that state and the rules for leaving it, independent of any I/O.

use reqwest::StatusCode;
use std::fmt;
use url::Url;

/// Why an archive traversal stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalEnd {
    /// The current page answered 404: the chain ran out
    NotFound,

    /// The "next" link pointed back at the seed page
    CycleDetected,

    /// A fetch, status, or parse failure was reported on the error channel
    Failed,

    /// Nobody is receiving pages any more
    Closed,
}

impl TraversalEnd {
    /// Returns true if the walk reached a natural end of the archive
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::NotFound | Self::CycleDetected)
    }
}

impl fmt::Display for TraversalEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotFound => "reached a missing page",
            Self::CycleDetected => "next link returned to the seed page",
            Self::Failed => "stopped on error",
            Self::Closed => "page receiver closed",
        };
        f.write_str(text)
    }
}

/// What the current page's response tells the walk to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// 200: parse it and look for the next link
    Parse,
    /// 404: end without reporting anything
    End,
    /// Anything else: report and end
    Fail,
}

impl PageStatus {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::OK => Self::Parse,
            StatusCode::NOT_FOUND => Self::End,
            _ => Self::Fail,
        }
    }
}

/// Outcome of following one resolved "next" link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalStep {
    /// Emit this page and keep walking from it
    Continue(Url),
    /// Stop the walk
    End(TraversalEnd),
}

/// The walk's only mutable state: the page being visited
#[derive(Debug, Clone)]
pub struct TraversalState {
    seed: Url,
    current: Url,
    visited: usize,
}

impl TraversalState {
    /// Starts a walk at the seed page
    pub fn new(seed: Url) -> Self {
        Self {
            current: seed.clone(),
            seed,
            visited: 1,
        }
    }

    pub fn seed(&self) -> &Url {
        &self.seed
    }

    pub fn current(&self) -> &Url {
        &self.current
    }

    /// Number of pages entered so far, the seed included
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Moves to `next` unless it leads back to the seed
    pub fn advance(&mut self, next: Url) -> TraversalStep {
        if next == self.seed {
            return TraversalStep::End(TraversalEnd::CycleDetected);
        }

        self.current = next.clone();
        self.visited += 1;
        TraversalStep::Continue(next)
    }
}
