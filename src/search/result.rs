//! Search result types and statistics

use std::time::Duration;

/// How a search ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<N> {
    /// A shortest path, source to target inclusive.
    Found(Vec<N>),
    /// Both frontiers emptied without the searches meeting.
    Exhausted,
    /// The trial budget ran out before the searches met.
    TrialsExhausted,
}

/// Result of a search operation
#[derive(Debug, Clone)]
pub struct SearchResult<N> {
    pub outcome: SearchOutcome<N>,
    pub statistics: SearchStatistics,
}

impl<N> SearchResult<N> {
    pub fn found(path: Vec<N>, statistics: SearchStatistics) -> Self {
        Self {
            outcome: SearchOutcome::Found(path),
            statistics,
        }
    }

    pub fn not_found(outcome: SearchOutcome<N>, statistics: SearchStatistics) -> Self {
        debug_assert!(!matches!(outcome, SearchOutcome::Found(_)));
        Self {
            outcome,
            statistics,
        }
    }

    /// The path, if one was found.
    pub fn path(&self) -> Option<&[N]> {
        match &self.outcome {
            SearchOutcome::Found(path) => Some(path.as_slice()),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<Vec<N>> {
        match self.outcome {
            SearchOutcome::Found(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Found(_))
    }

    /// Number of edges on the path.
    pub fn hop_count(&self) -> Option<usize> {
        self.path().map(|p| p.len().saturating_sub(1))
    }

    /// Wall-clock duration of the search.
    pub fn duration(&self) -> Duration {
        self.statistics.elapsed_time
    }

    /// Number of nodes whose expansion completed and was merged.
    pub fn expanded_nodes(&self) -> usize {
        self.statistics.expanded_nodes
    }
}

/// Statistics from a search operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Total time spent searching
    pub elapsed_time: Duration,
    /// Expansions that completed and were merged
    pub expanded_nodes: usize,
    /// Coordinator trials started, counted against the trial budget
    pub trials: usize,
    /// Rounds merged into the search state
    pub rounds: usize,
    /// Trials lost to lock timeouts
    pub failed_trials: usize,
    /// Expansions whose expander returned an error or panicked
    pub failed_expansions: usize,
    /// Expansions that missed their round's join deadline
    pub timed_out_expansions: usize,
    /// Nodes visited by the forward search
    pub forward_visited: usize,
    /// Nodes visited by the backward search
    pub backward_visited: usize,
}

impl SearchStatistics {
    /// Expanded nodes per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.expanded_nodes as f64 / secs
        }
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Duration: {} milliseconds\n", self.elapsed_time.as_millis()));
        s.push_str(&format!("Expanded nodes: {}\n", self.expanded_nodes));
        s.push_str(&format!("Throughput: {:.0} nodes/sec\n", self.throughput()));
        s.push_str(&format!("Trials: {}, rounds merged: {}\n", self.trials, self.rounds));
        s.push_str(&format!(
            "Visited: {} forward, {} backward\n",
            self.forward_visited, self.backward_visited
        ));

        if self.failed_trials > 0 {
            s.push_str(&format!("Failed trials: {}\n", self.failed_trials));
        }
        if self.failed_expansions > 0 || self.timed_out_expansions > 0 {
            s.push_str(&format!(
                "Lost expansions: {} failed, {} timed out\n",
                self.failed_expansions, self.timed_out_expansions
            ));
        }

        s
    }
}
