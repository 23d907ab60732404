//! Error types for the path finder.
//!
//! Configuration and endpoint errors are raised synchronously, before any
//! worker is started. Expansion failures never reach the caller as errors:
//! they are absorbed per task and show up in [`SearchStatistics`].
//! A missing path is a normal [`SearchOutcome`], not an error.
//!
//! [`SearchStatistics`]: crate::search::SearchStatistics
//! [`SearchOutcome`]: crate::search::SearchOutcome

use thiserror::Error;

/// Rejected configuration value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A count or duration that must be positive was zero.
    #[error("configuration option `{option}` must be positive")]
    NonPositive { option: &'static str },
}

/// Failure reported by a node expander for a single node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpansionError {
    /// The node is unknown to the expander.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// A transient failure such as a network error.
    #[error("transient expansion failure: {0}")]
    Transient(String),

    /// The expander panicked while producing successors.
    #[error("expander panicked: {0}")]
    Panicked(String),
}

/// Fatal outcome of a search invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The forward expander rejected the source node.
    #[error("the source node {0} is not a valid node")]
    InvalidSource(String),

    /// The backward expander rejected the target node.
    #[error("the target node {0} is not a valid node")]
    InvalidTarget(String),

    /// The worker pool could not be started.
    #[error("failed to start worker pool: {0}")]
    Pool(String),

    /// A parent chain was corrupted. Indicates a bug in the engine.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SearchError {
    /// Returns true for errors that signal a broken engine invariant.
    pub fn is_internal(&self) -> bool {
        matches!(self, SearchError::Internal(_))
    }
}
