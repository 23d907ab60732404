//! Fixed-size worker pool executing expansion jobs.
//!
//! Workers pull boxed jobs from a shared queue. The pool can outlive a
//! single search and be reused by the next one.

use crate::error::SearchError;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

/// A unit of work submitted to the pool.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// State shared between the pool handle and its workers.
#[derive(Debug, Default)]
struct PoolShared {
    /// Flag asking all workers to exit.
    should_stop: AtomicBool,
    /// Jobs currently running.
    busy: AtomicUsize,
}

impl PoolShared {
    fn should_stop(&self) -> bool {
        self.should_stop.load(Ordering::SeqCst)
    }

    fn signal_stop(&self) {
        self.should_stop.store(true, Ordering::SeqCst);
    }
}

/// Fixed-size pool of worker threads.
pub struct WorkerPool {
    jobs: Option<Sender<Job>>,
    shared: Arc<PoolShared>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers. Idle workers wake every `idle_poll` to check
    /// for shutdown.
    pub fn new(size: usize, idle_poll: Duration) -> Result<Self, SearchError> {
        let shared = Arc::new(PoolShared::default());
        let (tx, rx) = unbounded::<Job>();

        let mut pool = Self {
            jobs: Some(tx),
            shared,
            handles: Vec::with_capacity(size),
        };

        for worker_id in 0..size {
            let rx = rx.clone();
            let shared = Arc::clone(&pool.shared);
            let handle = std::thread::Builder::new()
                .name(format!("bibfs-worker-{}", worker_id))
                .spawn(move || run_worker(worker_id, rx, shared, idle_poll))
                .map_err(|e| SearchError::Pool(e.to_string()))?;
            pool.handles.push(handle);
        }

        tracing::debug!(workers = size, "worker pool started");
        Ok(pool)
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Number of jobs currently executing.
    pub fn busy(&self) -> usize {
        self.shared.busy.load(Ordering::SeqCst)
    }

    /// Queue a job for execution.
    pub fn execute<F>(&self, job: F) -> Result<(), SearchError>
    where
        F: FnOnce() + Send + 'static,
    {
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| SearchError::Pool("pool is shut down".to_string()))?;
        jobs.send(Box::new(job))
            .map_err(|_| SearchError::Pool("all workers have exited".to_string()))
    }

    /// Stop accepting jobs and wait for every worker to exit. Workers finish
    /// the job they are running first.
    pub fn shutdown(mut self) {
        self.close();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }

    fn close(&mut self) {
        self.shared.signal_stop();
        self.jobs.take();
    }
}

impl Drop for WorkerPool {
    // Workers are detached, not joined: a worker stuck in a slow expansion
    // must not block the caller.
    fn drop(&mut self) {
        self.close();
    }
}

fn run_worker(worker_id: usize, jobs: Receiver<Job>, shared: Arc<PoolShared>, idle_poll: Duration) {
    loop {
        if shared.should_stop() {
            break;
        }
        match jobs.recv_timeout(idle_poll) {
            Ok(job) => {
                shared.busy.fetch_add(1, Ordering::SeqCst);
                job();
                shared.busy.fetch_sub(1, Ordering::SeqCst);
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    tracing::trace!(worker_id, "worker exiting");
}
