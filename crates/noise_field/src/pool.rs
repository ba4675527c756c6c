//! Fixed worker pool for embarrassingly-parallel index ranges.
//!
//! A [`WorkPool`] runs a task over a contiguous index range split across a
//! fixed number of worker threads, blocking the caller until every index has
//! been processed. This single synchronous barrier is the only suspension
//! point in the crate.
use std::ops::Range;

use rayon::prelude::*;

use crate::error::{Error, Result};

/// A fixed-size pool of worker threads with blocking run-to-completion semantics.
pub struct WorkPool {
    inner: rayon::ThreadPool,
    threads: usize,
}

impl WorkPool {
    /// Create a pool with the given number of worker threads.
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(Error::InvalidConfig("thread count must be > 0".into()));
        }
        let inner = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| Error::Pool(e.to_string()))?;
        Ok(Self { inner, threads })
    }

    /// Number of worker threads in the pool.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `task` for every index in `range` across the pool's workers and
    /// block until all of them have finished.
    pub fn run<F>(&self, range: Range<usize>, task: F)
    where
        F: Fn(usize) + Send + Sync,
    {
        self.inner.install(|| {
            range.into_par_iter().for_each(|i| task(i));
        });
    }

    /// Execute `op` inside the pool so nested parallel iterators use these
    /// workers. Blocks until `op` returns.
    pub(crate) fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        self.inner.install(op)
    }
}

impl std::fmt::Debug for WorkPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkPool")
            .field("threads", &self.threads)
            .finish()
    }
}
