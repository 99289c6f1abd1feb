//! Bounded worker pool for per-file work.
//!
//! Files are independent, so the pool simply maps a job over them on a fixed
//! number of threads. Results come back in input order regardless of which
//! worker finished first.
//!
//! # Example
//!
//! ```
//! use smartsprite::split::ParallelSplit;
//!
//! let pool = ParallelSplit::new().with_jobs(2);
//! let doubled = pool.run(&[1, 2, 3], |_, n| n * 2).unwrap();
//! assert_eq!(doubled, vec![Some(2), Some(4), Some(6)]);
//! ```

use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::context::DEFAULT_JOBS;

/// Requests that no new files are started.
///
/// Files already in progress run to completion.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Create a handle that has not been triggered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop starting new work.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Parallel executor with a fixed worker count.
#[derive(Debug, Clone)]
pub struct ParallelSplit {
    /// Number of parallel jobs
    jobs: usize,
    /// Shared stop flag
    stop: StopHandle,
}

impl ParallelSplit {
    /// Create an executor with the default worker count.
    pub fn new() -> Self {
        Self { jobs: DEFAULT_JOBS, stop: StopHandle::new() }
    }

    /// Set the number of parallel jobs.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Use an externally owned stop handle.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Get the number of parallel jobs.
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Get the stop handle.
    pub fn stop_handle(&self) -> &StopHandle {
        &self.stop
    }

    /// Run `job` for every item on the pool.
    ///
    /// `job` receives the item's index and the item. Items not started
    /// because a stop was requested yield `None`.
    pub fn run<T, R, F>(&self, items: &[T], job: F) -> Result<Vec<Option<R>>, rayon::ThreadPoolBuildError>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> R + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .thread_name(|i| format!("smartsprite-worker-{}", i))
            .build()?;

        let stop = &self.stop;
        Ok(pool.install(|| {
            items
                .par_iter()
                .enumerate()
                .map(|(idx, item)| if stop.is_stopped() { None } else { Some(job(idx, item)) })
                .collect()
        }))
    }
}

impl Default for ParallelSplit {
    fn default() -> Self {
        Self::new()
    }
}
