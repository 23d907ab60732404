//! In-memory directed graph with forward and backward expanders.
//!
//! Used by the CLI to search graphs loaded from edge-list files, and handy
//! for testing the engine against a known graph. An optional per-call
//! latency makes expansions behave like remote lookups.

use crate::error::ExpansionError;
use crate::expander::NodeExpander;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Error while reading an edge list.
#[derive(Error, Debug)]
pub enum GraphParseError {
    #[error("line {line}: expected `SOURCE TARGET` or a single node, found {tokens} tokens")]
    BadLine { line: usize, tokens: usize },

    #[error("failed to read graph file: {0}")]
    Io(#[from] std::io::Error),
}

/// Directed graph with insertion-ordered adjacency lists.
#[derive(Debug, Clone)]
pub struct AdjacencyGraph<N> {
    successors: HashMap<N, Vec<N>>,
    predecessors: HashMap<N, Vec<N>>,
    latency: Duration,
}

impl<N> Default for AdjacencyGraph<N> {
    fn default() -> Self {
        Self {
            successors: HashMap::new(),
            predecessors: HashMap::new(),
            latency: Duration::ZERO,
        }
    }
}

impl<N: Clone + Eq + Hash> AdjacencyGraph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(from, to)` pairs.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (N, N)>,
    {
        let mut graph = Self::new();
        for (from, to) in edges {
            graph.add_edge(from, to);
        }
        graph
    }

    /// Sleep this long in every expansion.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn add_node(&mut self, node: N) {
        self.successors.entry(node.clone()).or_default();
        self.predecessors.entry(node).or_default();
    }

    /// Add the edge `from -> to`. Duplicate edges are ignored.
    pub fn add_edge(&mut self, from: N, to: N) {
        self.add_node(from.clone());
        self.add_node(to.clone());

        let out = self.successors.entry(from.clone()).or_default();
        if out.contains(&to) {
            return;
        }
        out.push(to.clone());
        self.predecessors.entry(to).or_default().push(from);
    }

    pub fn contains(&self, node: &N) -> bool {
        self.successors.contains_key(node)
    }

    pub fn node_count(&self) -> usize {
        self.successors.len()
    }

    pub fn edge_count(&self) -> usize {
        self.successors.values().map(Vec::len).sum()
    }

    /// Out-neighbors of `node`, in insertion order.
    pub fn successors(&self, node: &N) -> Option<&[N]> {
        self.successors.get(node).map(Vec::as_slice)
    }

    /// In-neighbors of `node`, in insertion order.
    pub fn predecessors(&self, node: &N) -> Option<&[N]> {
        self.predecessors.get(node).map(Vec::as_slice)
    }

    /// Freeze the graph and return its two expanders.
    pub fn into_expanders(self) -> (ForwardExpander<N>, BackwardExpander<N>) {
        let graph = Arc::new(self);
        (
            ForwardExpander {
                graph: Arc::clone(&graph),
            },
            BackwardExpander { graph },
        )
    }
}

impl AdjacencyGraph<String> {
    /// Parse a whitespace-separated edge list.
    ///
    /// Each line is `SOURCE TARGET` or a single isolated node. Blank lines
    /// and text after `#` are ignored.
    pub fn parse_edge_list(text: &str) -> Result<Self, GraphParseError> {
        let mut graph = Self::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("");
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                [] => {}
                [node] => graph.add_node(node.to_string()),
                [from, to] => graph.add_edge(from.to_string(), to.to_string()),
                _ => {
                    return Err(GraphParseError::BadLine {
                        line: index + 1,
                        tokens: tokens.len(),
                    });
                }
            }
        }
        Ok(graph)
    }

    pub fn load_edge_list(path: &Path) -> Result<Self, GraphParseError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_edge_list(&text)
    }
}

fn lookup<N: Debug>(neighbors: Option<&[N]>, node: &N, latency: Duration) -> Result<Vec<N>, ExpansionError>
where
    N: Clone,
{
    if !latency.is_zero() {
        std::thread::sleep(latency);
    }
    neighbors
        .map(<[N]>::to_vec)
        .ok_or_else(|| ExpansionError::UnknownNode(format!("{:?}", node)))
}

/// Expands along edges.
#[derive(Debug, Clone)]
pub struct ForwardExpander<N> {
    graph: Arc<AdjacencyGraph<N>>,
}

/// Expands along reverse edges.
#[derive(Debug, Clone)]
pub struct BackwardExpander<N> {
    graph: Arc<AdjacencyGraph<N>>,
}

impl<N> NodeExpander<N> for ForwardExpander<N>
where
    N: Clone + Eq + Hash + Debug + Send + Sync,
{
    fn generate_successors(&self, node: &N) -> Result<Vec<N>, ExpansionError> {
        lookup(self.graph.successors(node), node, self.graph.latency)
    }

    fn is_valid_node(&self, node: &N) -> bool {
        self.graph.contains(node)
    }
}

impl<N> NodeExpander<N> for BackwardExpander<N>
where
    N: Clone + Eq + Hash + Debug + Send + Sync,
{
    fn generate_successors(&self, node: &N) -> Result<Vec<N>, ExpansionError> {
        lookup(self.graph.predecessors(node), node, self.graph.latency)
    }

    fn is_valid_node(&self, node: &N) -> bool {
        self.graph.contains(node)
    }
}
