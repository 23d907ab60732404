//! Per-direction search state: visited map and current frontier.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

/// Search direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From the source, following edges.
    Forward,
    /// From the target, following reverse edges.
    Backward,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// How a node was first reached in one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionRecord<N> {
    /// The node that discovered this one. `None` only for the start node.
    pub parent: Option<N>,
    /// Hops from the start node.
    pub depth: usize,
    /// Position in discovery order. Breaks ties between meeting nodes.
    pub order: usize,
}

/// Visited map plus current frontier for one direction.
///
/// Invariants: every frontier node is in `visited` at depth
/// `self.depth`; a node is recorded at most once (first discovery wins);
/// a recorded node's depth is its parent's depth plus one.
#[derive(Debug, Clone)]
pub struct DirectionState<N> {
    direction: Direction,
    start: N,
    visited: HashMap<N, ExpansionRecord<N>>,
    frontier: Vec<N>,
    depth: usize,
}

impl<N: Clone + Eq + Hash> DirectionState<N> {
    /// Create a state whose only visited node is `start`, at depth 0.
    pub fn new(direction: Direction, start: N) -> Self {
        let mut visited = HashMap::new();
        visited.insert(
            start.clone(),
            ExpansionRecord {
                parent: None,
                depth: 0,
                order: 0,
            },
        );
        Self {
            direction,
            start: start.clone(),
            visited,
            frontier: vec![start],
            depth: 0,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The node this direction started from.
    pub fn start(&self) -> &N {
        &self.start
    }

    /// Nodes pending expansion, in discovery order.
    pub fn frontier(&self) -> &[N] {
        &self.frontier
    }

    /// Depth of the current frontier.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn record(&self, node: &N) -> Option<&ExpansionRecord<N>> {
        self.visited.get(node)
    }

    /// Record `node` as discovered from `parent`. Returns false if the node
    /// was already visited in this direction.
    ///
    /// `parent` must be a visited node on the current frontier depth.
    fn discover(&mut self, node: N, parent: &N) -> bool {
        let order = self.visited.len();
        match self.visited.entry(node) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(ExpansionRecord {
                    parent: Some(parent.clone()),
                    depth: self.depth + 1,
                    order,
                });
                true
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn overwrite_record(&mut self, node: N, record: ExpansionRecord<N>) {
        self.visited.insert(node, record);
    }

    /// Merge one round of expansions and advance to the next depth.
    ///
    /// `expansions` pairs each expanded frontier node with its successors and
    /// must be in frontier order. Returns the newly discovered nodes in
    /// discovery order; they form the new frontier.
    pub fn advance<I>(&mut self, expansions: I) -> Vec<N>
    where
        I: IntoIterator<Item = (N, Vec<N>)>,
    {
        let mut next = Vec::new();
        for (parent, successors) in expansions {
            debug_assert_eq!(
                self.visited.get(&parent).map(|r| r.depth),
                Some(self.depth),
                "expanded node must belong to the current frontier"
            );
            for successor in successors {
                if self.discover(successor.clone(), &parent) {
                    next.push(successor);
                }
            }
        }
        self.frontier = next.clone();
        self.depth += 1;
        next
    }
}
