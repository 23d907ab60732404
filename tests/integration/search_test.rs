use bibfs::graph::AdjacencyGraph;
use bibfs::search::{FinderConfig, PathFinder, SearchOutcome, search};
use bibfs::{ExpansionError, NodeExpander, SearchError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

fn fast_config() -> FinderConfig {
    FinderConfig::default()
        .with_threads(4)
        .with_master_trials(500)
        .with_master_sleep(Duration::from_millis(2))
        .with_slave_sleep(Duration::from_millis(2))
        .with_join_timeout(Duration::from_secs(10))
        .with_lock_wait(Duration::from_millis(50))
}

fn random_graph(rng: &mut ChaCha8Rng, nodes: u32, edges: usize) -> AdjacencyGraph<u32> {
    let mut graph = AdjacencyGraph::new();
    for n in 0..nodes {
        graph.add_node(n);
    }
    for _ in 0..edges {
        let from = rng.random_range(0..nodes);
        let to = rng.random_range(0..nodes);
        graph.add_edge(from, to);
    }
    graph
}

/// Plain single-threaded BFS distance.
fn reference_distance(graph: &AdjacencyGraph<u32>, source: u32, target: u32) -> Option<usize> {
    let mut dist = HashMap::from([(source, 0usize)]);
    let mut queue = VecDeque::from([source]);
    while let Some(node) = queue.pop_front() {
        if node == target {
            return dist.get(&node).copied();
        }
        let d = dist[&node];
        for &next in graph.successors(&node).unwrap_or(&[]) {
            if !dist.contains_key(&next) {
                dist.insert(next, d + 1);
                queue.push_back(next);
            }
        }
    }
    None
}

fn assert_is_path(graph: &AdjacencyGraph<u32>, path: &[u32], source: u32, target: u32) {
    assert_eq!(path.first(), Some(&source));
    assert_eq!(path.last(), Some(&target));
    for pair in path.windows(2) {
        let successors = graph.successors(&pair[0]).unwrap();
        assert!(
            successors.contains(&pair[1]),
            "{} -> {} is not an edge",
            pair[0],
            pair[1]
        );
    }
    let unique: HashSet<_> = path.iter().collect();
    assert_eq!(unique.len(), path.len(), "path repeats a node: {:?}", path);
}

#[test]
fn test_matches_reference_bfs_on_random_graphs() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let finder = PathFinder::new(fast_config()).unwrap();

    for _ in 0..40 {
        let nodes = rng.random_range(2..60);
        let edges = rng.random_range(0..(nodes as usize * 3));
        let graph = random_graph(&mut rng, nodes, edges);
        let source = rng.random_range(0..nodes);
        let target = rng.random_range(0..nodes);

        let expected = reference_distance(&graph, source, target);
        let (forward, backward) = graph.clone().into_expanders();
        let result = finder.search(source, target, forward, backward).unwrap();

        match expected {
            Some(distance) => {
                let path = result.path().expect("path exists");
                assert_eq!(path.len() - 1, distance, "graph {:?}", graph);
                assert_is_path(&graph, path, source, target);
            }
            None => assert_eq!(result.outcome, SearchOutcome::Exhausted),
        }
    }
}

#[test]
fn test_thread_count_does_not_change_path() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let graph = random_graph(&mut rng, 200, 600);
    let expected = reference_distance(&graph, 0, 199);

    let mut paths = Vec::new();
    for threads in [1, 2, 8] {
        let (forward, backward) = graph.clone().into_expanders();
        let config = fast_config().with_threads(threads);
        let result = search(&config, 0, 199, forward, backward).unwrap();
        assert_eq!(result.hop_count(), expected);
        paths.push(result.into_path());
    }
    assert!(paths.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_repeated_runs_are_deterministic() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let graph = random_graph(&mut rng, 150, 500).with_latency(Duration::from_millis(1));
    let finder = PathFinder::new(fast_config()).unwrap();

    let (forward, backward) = graph.clone().into_expanders();
    let first = finder.search(3, 140, forward, backward).unwrap();
    for _ in 0..3 {
        let (forward, backward) = graph.clone().into_expanders();
        let again = finder.search(3, 140, forward, backward).unwrap();
        assert_eq!(again.path(), first.path());
    }
}

#[test]
fn test_chain_graph() {
    let (forward, backward) =
        AdjacencyGraph::from_edges([("A", "B"), ("B", "C"), ("C", "D")]).into_expanders();
    let result = search(&fast_config(), "A", "D", forward, backward).unwrap();
    assert_eq!(result.path(), Some(&["A", "B", "C", "D"][..]));
}

#[test]
fn test_equal_length_paths_tie_break_consistently() {
    // Two shortest paths: s-a-t and s-b-t.
    let edges = [("s", "a"), ("s", "b"), ("a", "t"), ("b", "t")];
    let finder = PathFinder::new(fast_config()).unwrap();

    let mut seen = HashSet::new();
    for _ in 0..10 {
        let (forward, backward) = AdjacencyGraph::from_edges(edges).into_expanders();
        let result = finder.search("s", "t", forward, backward).unwrap();
        assert_eq!(result.hop_count(), Some(2));
        seen.insert(result.into_path());
    }
    assert_eq!(seen.len(), 1);
}

#[test]
fn test_disconnected_graph_reports_no_path() {
    let mut graph = AdjacencyGraph::new();
    graph.add_node(1u32);
    graph.add_node(2u32);
    let (forward, backward) = graph.into_expanders();

    let result = search(&fast_config(), 1, 2, forward, backward).unwrap();
    assert_eq!(result.outcome, SearchOutcome::Exhausted);
    assert_eq!(result.expanded_nodes(), 2);
}

#[test]
fn test_source_equals_target() {
    let (forward, backward) = AdjacencyGraph::from_edges([(1u32, 2u32)]).into_expanders();
    let result = search(&fast_config(), 2, 2, forward, backward).unwrap();
    assert_eq!(result.path(), Some(&[2][..]));
    assert_eq!(result.expanded_nodes(), 0);
}

#[test]
fn test_invalid_endpoint() {
    let (forward, backward) = AdjacencyGraph::from_edges([("x", "y")]).into_expanders();
    let err = search(&fast_config(), "nowhere", "y", forward, backward).unwrap_err();
    assert!(matches!(err, SearchError::InvalidSource(_)));
    assert!(!err.is_internal());
}

#[test]
fn test_zero_config_rejected() {
    let (forward, backward) = AdjacencyGraph::from_edges([("x", "y")]).into_expanders();
    let config = fast_config().with_join_timeout(Duration::ZERO);
    let err = search(&config, "x", "y", forward, backward).unwrap_err();
    assert!(matches!(err, SearchError::Config(_)));
}

/// Expander that never answers within the join timeout.
struct Stuck;

impl NodeExpander<u32> for Stuck {
    fn generate_successors(&self, node: &u32) -> Result<Vec<u32>, ExpansionError> {
        std::thread::sleep(Duration::from_millis(200));
        Ok(vec![node + 1])
    }

    fn is_valid_node(&self, _node: &u32) -> bool {
        true
    }
}

#[test]
fn test_total_stall_terminates_within_bound() {
    let config = fast_config()
        .with_master_trials(3)
        .with_join_timeout(Duration::from_millis(20))
        .with_lock_wait(Duration::from_millis(5))
        .with_master_sleep(Duration::from_millis(5));

    let start = Instant::now();
    let result = search(&config, 0, 100, Stuck, Stuck).unwrap();
    let elapsed = start.elapsed();

    // Each stalled round leaves its side with an empty frontier.
    assert_eq!(result.outcome, SearchOutcome::Exhausted);
    assert_eq!(result.statistics.timed_out_expansions, 2);
    assert_eq!(result.expanded_nodes(), 0);
    // Allow scheduling slack on top of the configured bound.
    assert!(elapsed < config.stall_bound() + Duration::from_millis(500));
}

/// Unbounded chain `n -> n + 1`.
struct Counting;

impl NodeExpander<u64> for Counting {
    fn generate_successors(&self, node: &u64) -> Result<Vec<u64>, ExpansionError> {
        Ok(vec![node + 1])
    }

    fn is_valid_node(&self, _node: &u64) -> bool {
        true
    }
}

/// Valid nodes with no predecessors.
struct Dead;

impl NodeExpander<u64> for Dead {
    fn generate_successors(&self, _node: &u64) -> Result<Vec<u64>, ExpansionError> {
        Ok(Vec::new())
    }

    fn is_valid_node(&self, _node: &u64) -> bool {
        true
    }
}

#[test]
fn test_unbounded_graph_stops_at_trial_budget() {
    let config = fast_config()
        .with_master_trials(5)
        .with_join_timeout(Duration::from_millis(200))
        .with_lock_wait(Duration::from_millis(5))
        .with_master_sleep(Duration::from_millis(5));

    let start = Instant::now();
    let result = search(&config, 0, u64::MAX, Counting, Dead).unwrap();
    let elapsed = start.elapsed();

    assert_eq!(result.outcome, SearchOutcome::TrialsExhausted);
    assert_eq!(result.statistics.trials, 5);
    assert_eq!(result.statistics.failed_trials, 0);
    assert_eq!(result.expanded_nodes(), 5);
    assert!(elapsed < config.stall_bound() + Duration::from_millis(500));
}

/// Graph expander whose listed nodes always fail.
struct Flaky {
    inner: bibfs::graph::ForwardExpander<u32>,
    failing: HashSet<u32>,
    calls: Arc<AtomicUsize>,
}

impl NodeExpander<u32> for Flaky {
    fn generate_successors(&self, node: &u32) -> Result<Vec<u32>, ExpansionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(node) {
            return Err(ExpansionError::Transient(format!("node {} unreachable", node)));
        }
        self.inner.generate_successors(node)
    }

    fn is_valid_node(&self, node: &u32) -> bool {
        self.inner.is_valid_node(node)
    }
}

#[test]
fn test_failed_expansions_are_absorbed() {
    // Shortest path 0-1-8-9, but node 1 always fails forward, so the
    // search settles for 0-2-3-4-9. Nodes 5..7 widen the backward frontier
    // so the forward side does the expanding.
    let graph = AdjacencyGraph::from_edges([
        (0u32, 1u32),
        (1, 8),
        (8, 9),
        (0, 2),
        (2, 3),
        (3, 4),
        (4, 9),
        (5, 9),
        (6, 9),
        (7, 9),
    ]);
    let (forward, backward) = graph.into_expanders();
    let calls = Arc::new(AtomicUsize::new(0));
    let flaky = Flaky {
        inner: forward,
        failing: HashSet::from([1]),
        calls: Arc::clone(&calls),
    };

    let result = search(&fast_config(), 0, 9, flaky, backward).unwrap();
    assert_eq!(result.path(), Some(&[0, 2, 3, 4, 9][..]));
    assert_eq!(result.statistics.failed_expansions, 1);
    assert_eq!(result.statistics.failed_trials, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn test_failing_side_hands_over_to_other_direction() {
    // Forward expansion of 1 always fails; the backward side still reaches 1
    // from 2 and the searches meet there.
    let (forward, backward) = AdjacencyGraph::from_edges([(0u32, 1u32), (1, 2)]).into_expanders();
    let calls = Arc::new(AtomicUsize::new(0));
    let flaky = Flaky {
        inner: forward,
        failing: HashSet::from([1]),
        calls: Arc::clone(&calls),
    };

    let config = fast_config().with_master_trials(5);
    let result = search(&config, 0, 2, flaky, backward).unwrap();
    assert_eq!(result.path(), Some(&[0, 1, 2][..]));
    assert_eq!(result.statistics.failed_expansions, 1);
    assert_eq!(result.statistics.failed_trials, 0);
    assert_eq!(result.statistics.trials, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
