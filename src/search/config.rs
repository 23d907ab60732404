//! Configuration for the path finder.

use crate::error::ConfigError;
use std::time::Duration;

/// Default configuration. Never mutated; copy it and use the `with_*`
/// builders to change individual options.
pub const DEFAULT_CONFIG: FinderConfig = FinderConfig {
    thread_count: 8,
    master_trials: 50,
    master_sleep: Duration::from_millis(10),
    slave_sleep: Duration::from_millis(10),
    join_timeout: Duration::from_millis(4000),
    lock_wait: Duration::from_millis(5),
};

/// Configuration for a search. Immutable once a search starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinderConfig {
    /// Number of worker threads in the pool.
    pub thread_count: usize,
    /// Maximum number of coordinator trials (rounds) before giving up.
    pub master_trials: usize,
    /// Coordinator sleep after a failed trial.
    pub master_sleep: Duration,
    /// Idle poll interval of pool workers.
    pub slave_sleep: Duration,
    /// Upper bound on waiting for one round of expansions.
    pub join_timeout: Duration,
    /// Upper bound on acquiring the search state lock.
    pub lock_wait: Duration,
}

impl Default for FinderConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

impl FinderConfig {
    pub fn with_threads(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count;
        self
    }

    pub fn with_master_trials(mut self, trials: usize) -> Self {
        self.master_trials = trials;
        self
    }

    pub fn with_master_sleep(mut self, sleep: Duration) -> Self {
        self.master_sleep = sleep;
        self
    }

    pub fn with_slave_sleep(mut self, sleep: Duration) -> Self {
        self.slave_sleep = sleep;
        self
    }

    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    pub fn with_lock_wait(mut self, wait: Duration) -> Self {
        self.lock_wait = wait;
        self
    }

    /// Reject zero counts and zero durations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("thread_count", self.thread_count > 0),
            ("master_trials", self.master_trials > 0),
            ("master_sleep", !self.master_sleep.is_zero()),
            ("slave_sleep", !self.slave_sleep.is_zero()),
            ("join_timeout", !self.join_timeout.is_zero()),
            ("lock_wait", !self.lock_wait.is_zero()),
        ];

        match checks.iter().find(|(_, ok)| !ok) {
            Some((option, _)) => Err(ConfigError::NonPositive { option: *option }),
            None => Ok(()),
        }
    }

    /// Worst-case wall-clock time of a search whose trials all stall before
    /// it gives up.
    pub fn stall_bound(&self) -> Duration {
        let per_trial = self.join_timeout + self.lock_wait + self.master_sleep;
        per_trial * self.master_trials as u32
    }
}
