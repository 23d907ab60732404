//! Shortest paths in lazily expanded graphs.
//!
//! `bibfs` finds a shortest path between two nodes of a graph whose edges
//! are only discovered by asking a [`NodeExpander`] for a node's neighbors.
//! See [`search`] for the engine.

pub mod error;
pub mod expander;
pub mod graph;
pub mod search;

pub use error::{ConfigError, ExpansionError, SearchError};
pub use expander::NodeExpander;
pub use search::{FinderConfig, PathFinder, SearchOutcome, SearchResult, SearchStatistics};
