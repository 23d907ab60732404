//! Node expanders: one direction's view of an implicit graph.

use crate::error::ExpansionError;

/// Produces the neighbors of a node on demand.
///
/// A forward expander returns the nodes reachable from `node` in one hop.
/// A backward expander returns the nodes that reach `node` in one hop.
/// The search treats both the same way.
///
/// Implementations may block (e.g. on a network round-trip) and are called
/// from worker threads, so they must be `Send + Sync`. The search never
/// expands the same node twice concurrently.
pub trait NodeExpander<N>: Send + Sync {
    /// Return the successors of `node` in this expander's direction.
    ///
    /// An empty list is a dead end, not an error.
    fn generate_successors(&self, node: &N) -> Result<Vec<N>, ExpansionError>;

    /// Check whether `node` exists. Must return `false` rather than fail
    /// for malformed or unknown nodes.
    fn is_valid_node(&self, node: &N) -> bool;
}

impl<N, E> NodeExpander<N> for std::sync::Arc<E>
where
    E: NodeExpander<N> + ?Sized,
{
    fn generate_successors(&self, node: &N) -> Result<Vec<N>, ExpansionError> {
        (**self).generate_successors(node)
    }

    fn is_valid_node(&self, node: &N) -> bool {
        (**self).is_valid_node(node)
    }
}
