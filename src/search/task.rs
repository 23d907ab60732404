//! Expansion tasks: dispatching one round of a frontier to the pool and
//! joining it with a deadline.

use crate::error::{ExpansionError, SearchError};
use crate::expander::NodeExpander;
use crate::search::frontier::Direction;
use crate::search::pool::WorkerPool;
use crossbeam_channel::{Receiver, RecvTimeoutError, unbounded};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Result of expanding one frontier node. Sent from a worker to the
/// coordinator; workers never touch search state.
#[derive(Debug)]
pub struct TaskReport<N> {
    /// Position of the node in the dispatched frontier.
    pub index: usize,
    pub node: N,
    pub outcome: Result<Vec<N>, ExpansionError>,
}

/// A dispatched round whose reports have not been collected yet.
pub struct RoundBatch<N> {
    direction: Direction,
    submitted: usize,
    reports: Receiver<TaskReport<N>>,
    abandoned: Arc<AtomicBool>,
}

/// Reports collected for one round, in frontier order.
#[derive(Debug)]
pub struct JoinedRound<N> {
    pub direction: Direction,
    pub submitted: usize,
    /// Successful expansions as `(node, successors)`, sorted by frontier
    /// position.
    pub completed: Vec<(N, Vec<N>)>,
    /// Tasks whose expander returned an error.
    pub failed: usize,
    /// Tasks that did not report before the deadline.
    pub timed_out: usize,
}

impl<N> JoinedRound<N> {
    /// True when not a single task completed successfully.
    pub fn is_stalled(&self) -> bool {
        self.completed.is_empty() && self.submitted > 0
    }
}

/// Submit one expansion task per frontier node.
pub fn dispatch<N>(
    pool: &WorkerPool,
    direction: Direction,
    expander: &Arc<dyn NodeExpander<N>>,
    frontier: &[N],
) -> Result<RoundBatch<N>, SearchError>
where
    N: Clone + Send + 'static,
{
    let (tx, rx) = unbounded();
    let abandoned = Arc::new(AtomicBool::new(false));

    for (index, node) in frontier.iter().enumerate() {
        let tx = tx.clone();
        let expander = Arc::clone(expander);
        let abandoned = Arc::clone(&abandoned);
        let node = node.clone();

        pool.execute(move || {
            // Jobs still queued when their round timed out are skipped.
            if abandoned.load(Ordering::SeqCst) {
                return;
            }
            let outcome = expand(expander.as_ref(), &node);
            // The receiver is gone once the round is joined; late reports
            // are dropped here.
            let _ = tx.send(TaskReport {
                index,
                node,
                outcome,
            });
        })?;
    }

    Ok(RoundBatch {
        direction,
        submitted: frontier.len(),
        reports: rx,
        abandoned,
    })
}

fn expand<N>(expander: &dyn NodeExpander<N>, node: &N) -> Result<Vec<N>, ExpansionError> {
    match catch_unwind(AssertUnwindSafe(|| expander.generate_successors(node))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ExpansionError::Panicked(message))
        }
    }
}

impl<N> RoundBatch<N> {
    /// Collect reports until every task has reported or `timeout` elapses.
    ///
    /// Tasks still running at the deadline are not interrupted; their
    /// results are discarded when they finish.
    pub fn join(self, timeout: Duration) -> JoinedRound<N> {
        let deadline = Instant::now() + timeout;
        let mut reports = Vec::with_capacity(self.submitted);

        while reports.len() < self.submitted {
            match self.reports.recv_deadline(deadline) {
                Ok(report) => reports.push(report),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let timed_out = self.submitted - reports.len();
        if timed_out > 0 {
            self.abandoned.store(true, Ordering::SeqCst);
            tracing::warn!(
                direction = %self.direction,
                timed_out,
                submitted = self.submitted,
                "expansion round timed out; late results will be discarded"
            );
        }

        reports.sort_by_key(|r| r.index);

        let mut completed = Vec::with_capacity(reports.len());
        let mut failed = 0;
        for report in reports {
            match report.outcome {
                Ok(successors) => completed.push((report.node, successors)),
                Err(e) => {
                    failed += 1;
                    tracing::warn!(direction = %self.direction, error = %e, "expansion failed");
                }
            }
        }

        JoinedRound {
            direction: self.direction,
            submitted: self.submitted,
            completed,
            failed,
            timed_out,
        }
    }
}
