//! Concurrent bidirectional breadth-first search.
//!
//! The search runs two breadth-first searches, one from the source along
//! edges and one from the target along reverse edges, and stops when they
//! meet. Node expansion is the expensive part (often one network round-trip
//! per node), so every round fans the current frontier out over a worker
//! pool.
//!
//! # Architecture
//!
//! - A **coordinator** that owns all search state and drives rounds
//! - A **worker pool** that runs expansion tasks
//! - **Expansion tasks** that report successors back over a channel
//! - **Direction states** holding each side's visited map and frontier
//! - A **path reconstructor** that joins the two parent chains
//!
//! # Example
//!
//! ```
//! use bibfs::graph::AdjacencyGraph;
//! use bibfs::search::{search, FinderConfig};
//!
//! let graph = AdjacencyGraph::from_edges([("a", "b"), ("b", "c"), ("c", "d")]);
//! let (forward, backward) = graph.into_expanders();
//!
//! let result = search(&FinderConfig::default(), "a", "d", forward, backward).unwrap();
//! assert_eq!(result.path(), Some(&["a", "b", "c", "d"][..]));
//! ```

pub mod config;
pub mod coordinator;
pub mod frontier;
pub mod path;
pub mod pool;
pub mod result;
pub mod task;

pub use config::{DEFAULT_CONFIG, FinderConfig};
pub use coordinator::{PathFinder, search};
pub use frontier::{Direction, DirectionState, ExpansionRecord};
pub use result::{SearchOutcome, SearchResult, SearchStatistics};
