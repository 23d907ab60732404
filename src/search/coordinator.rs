//! Search coordinator: drives bidirectional rounds over the worker pool.
//!
//! The coordinator owns both direction states. Each round it picks the side
//! with the smaller frontier, hands every frontier node to the pool, joins
//! the batch with a deadline and merges the completed expansions under a
//! lock acquired with a bounded wait. Workers only return reports.

use crate::error::SearchError;
use crate::expander::NodeExpander;
use crate::search::config::FinderConfig;
use crate::search::frontier::{Direction, DirectionState};
use crate::search::path::reconstruct;
use crate::search::pool::WorkerPool;
use crate::search::result::{SearchOutcome, SearchResult, SearchStatistics};
use crate::search::task::{self, JoinedRound};
use parking_lot::Mutex;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Reusable bidirectional path finder.
///
/// The worker pool is started on the first search that passes validation
/// and is shared by later searches. No search state survives between calls.
pub struct PathFinder {
    config: FinderConfig,
    pool: Mutex<Option<Arc<WorkerPool>>>,
}

impl PathFinder {
    /// Create a finder, rejecting invalid configuration.
    pub fn new(config: FinderConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            config,
            pool: Mutex::new(None),
        })
    }

    /// True once a search has started the worker pool.
    pub fn is_pool_started(&self) -> bool {
        self.pool.lock().is_some()
    }

    fn pool(&self) -> Result<Arc<WorkerPool>, SearchError> {
        let mut slot = self.pool.lock();
        if let Some(pool) = slot.as_ref() {
            return Ok(Arc::clone(pool));
        }
        let pool = Arc::new(WorkerPool::new(
            self.config.thread_count,
            self.config.slave_sleep,
        )?);
        *slot = Some(Arc::clone(&pool));
        Ok(pool)
    }

    /// Find a shortest path from `source` to `target`.
    ///
    /// `forward` validates the source and expands along edges; `backward`
    /// validates the target and expands along reverse edges. Invalid
    /// endpoints are rejected before any expansion is issued.
    pub fn search<N, F, B>(
        &self,
        source: N,
        target: N,
        forward: F,
        backward: B,
    ) -> Result<SearchResult<N>, SearchError>
    where
        N: Clone + Eq + Hash + Debug + Send + 'static,
        F: NodeExpander<N> + 'static,
        B: NodeExpander<N> + 'static,
    {
        let start_time = Instant::now();

        if !forward.is_valid_node(&source) {
            return Err(SearchError::InvalidSource(format!("{:?}", source)));
        }
        if !backward.is_valid_node(&target) {
            return Err(SearchError::InvalidTarget(format!("{:?}", target)));
        }

        if source == target {
            debug!(node = ?source, "source equals target");
            let statistics = SearchStatistics {
                elapsed_time: start_time.elapsed(),
                forward_visited: 1,
                backward_visited: 1,
                ..Default::default()
            };
            return Ok(SearchResult::found(vec![source], statistics));
        }

        let pool = self.pool()?;
        let state = Mutex::new(SearchState::new(source, target));
        let run = SearchRun {
            config: &self.config,
            pool: &pool,
            forward: Arc::new(forward),
            backward: Arc::new(backward),
            statistics: SearchStatistics::default(),
            start_time,
        };
        run.execute(&state)
    }
}

/// Run one search with a finder built from `config`.
pub fn search<N, F, B>(
    config: &FinderConfig,
    source: N,
    target: N,
    forward: F,
    backward: B,
) -> Result<SearchResult<N>, SearchError>
where
    N: Clone + Eq + Hash + Debug + Send + 'static,
    F: NodeExpander<N> + 'static,
    B: NodeExpander<N> + 'static,
{
    PathFinder::new(*config)?.search(source, target, forward, backward)
}

/// Both direction states. Only touched while holding the run's lock.
struct SearchState<N> {
    forward: DirectionState<N>,
    backward: DirectionState<N>,
}

impl<N: Clone + Eq + Hash> SearchState<N> {
    fn new(source: N, target: N) -> Self {
        Self {
            forward: DirectionState::new(Direction::Forward, source),
            backward: DirectionState::new(Direction::Backward, target),
        }
    }

    fn side(&self, direction: Direction) -> &DirectionState<N> {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }

    fn side_mut(&mut self, direction: Direction) -> &mut DirectionState<N> {
        match direction {
            Direction::Forward => &mut self.forward,
            Direction::Backward => &mut self.backward,
        }
    }

    /// Pick the direction to expand next and snapshot its frontier.
    /// `None` when both frontiers are empty.
    fn plan(&self) -> Option<(Direction, Vec<N>)> {
        let forward = self.forward.frontier().len();
        let backward = self.backward.frontier().len();

        let direction = match (forward, backward) {
            (0, 0) => return None,
            (0, _) => Direction::Backward,
            (_, 0) => Direction::Forward,
            (f, b) if b < f => Direction::Backward,
            _ => Direction::Forward,
        };
        Some((direction, self.side(direction).frontier().to_vec()))
    }

    /// Merge a joined round and return the best meeting node among the
    /// newly discovered ones: smallest forward + backward depth, earliest
    /// discovery on this side on ties.
    fn merge(&mut self, round: JoinedRound<N>) -> Option<N> {
        let direction = round.direction;
        let added = self.side_mut(direction).advance(round.completed);

        let ours = self.side(direction);
        let theirs = self.side(direction.opposite());

        added
            .iter()
            .filter_map(|node| {
                let mine = ours.record(node)?;
                let other = theirs.record(node)?;
                Some(((mine.depth + other.depth, mine.order), node))
            })
            .min_by_key(|(key, _)| *key)
            .map(|(_, node)| node.clone())
    }
}

/// Per-invocation coordinator.
struct SearchRun<'a, N> {
    config: &'a FinderConfig,
    pool: &'a WorkerPool,
    forward: Arc<dyn NodeExpander<N>>,
    backward: Arc<dyn NodeExpander<N>>,
    statistics: SearchStatistics,
    start_time: Instant,
}

impl<'a, N> SearchRun<'a, N>
where
    N: Clone + Eq + Hash + Debug + Send + 'static,
{
    fn expander(&self, direction: Direction) -> &Arc<dyn NodeExpander<N>> {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }

    fn execute(mut self, state: &Mutex<SearchState<N>>) -> Result<SearchResult<N>, SearchError> {
        // A round that was joined but could not be merged because the lock
        // timed out. Retried before anything new is dispatched.
        let mut pending: Option<JoinedRound<N>> = None;

        for trial in 1..=self.config.master_trials {
            self.statistics.trials = trial;

            let round = match pending.take() {
                Some(round) => round,
                None => {
                    let plan = match state.try_lock_for(self.config.lock_wait) {
                        Some(guard) => guard.plan(),
                        None => {
                            self.fail_trial("lock wait timed out while planning");
                            continue;
                        }
                    };
                    let Some((direction, frontier)) = plan else {
                        return Ok(self.finish(SearchOutcome::Exhausted));
                    };
                    self.run_round(direction, &frontier)?
                }
            };

            let Some(mut guard) = state.try_lock_for(self.config.lock_wait) else {
                pending = Some(round);
                self.fail_trial("lock wait timed out while merging");
                continue;
            };

            // A stalled round still advances its side, to an empty frontier,
            // so the opposite direction takes over.
            let direction = round.direction;
            let stalled = round.is_stalled();
            self.statistics.expanded_nodes += round.completed.len();
            self.statistics.rounds += 1;
            let meeting = guard.merge(round);
            self.statistics.forward_visited = guard.forward.visited_count();
            self.statistics.backward_visited = guard.backward.visited_count();

            debug!(
                trial,
                %direction,
                stalled,
                depth = guard.side(direction).depth(),
                next_frontier = guard.side(direction).frontier().len(),
                "round merged"
            );

            if let Some(meeting) = meeting {
                let path = reconstruct(&guard.forward, &guard.backward, &meeting)?;
                debug!(node = ?meeting, hops = path.len() - 1, "searches met");
                drop(guard);
                return Ok(self.finish(SearchOutcome::Found(path)));
            }
        }

        Ok(self.finish(SearchOutcome::TrialsExhausted))
    }

    fn run_round(&mut self, direction: Direction, frontier: &[N]) -> Result<JoinedRound<N>, SearchError> {
        debug!(
            %direction,
            frontier = frontier.len(),
            workers = self.pool.size(),
            busy_workers = self.pool.busy(),
            "dispatching round"
        );
        let batch = task::dispatch(self.pool, direction, self.expander(direction), frontier)?;
        let round = batch.join(self.config.join_timeout);

        self.statistics.failed_expansions += round.failed;
        self.statistics.timed_out_expansions += round.timed_out;
        Ok(round)
    }

    fn fail_trial(&mut self, reason: &str) {
        self.statistics.failed_trials += 1;
        warn!(
            failed = self.statistics.failed_trials,
            trial = self.statistics.trials,
            budget = self.config.master_trials,
            reason,
            "coordinator trial failed"
        );
        std::thread::sleep(self.config.master_sleep);
    }

    fn finish(mut self, outcome: SearchOutcome<N>) -> SearchResult<N> {
        self.statistics.elapsed_time = self.start_time.elapsed();
        let statistics = self.statistics;

        match outcome {
            SearchOutcome::Found(path) => {
                info!(
                    hops = path.len() - 1,
                    expanded = statistics.expanded_nodes,
                    elapsed_ms = statistics.elapsed_time.as_millis() as u64,
                    "path found"
                );
                SearchResult::found(path, statistics)
            }
            outcome => {
                info!(
                    ?outcome,
                    expanded = statistics.expanded_nodes,
                    failed_trials = statistics.failed_trials,
                    elapsed_ms = statistics.elapsed_time.as_millis() as u64,
                    "no path found"
                );
                SearchResult::not_found(outcome, statistics)
            }
        }
    }
}
