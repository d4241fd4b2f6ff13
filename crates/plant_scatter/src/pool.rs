//! Fixed-size worker pool that drains one colour class at a time.
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::error::{Error, Result};

/// A dedicated rayon pool.
///
/// [`WorkerPool::drain`] blocks until every task of the batch has finished, so
/// callers get a barrier between colour classes for free.
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// Build a pool with `workers` threads, or one per available core when `None`.
    pub fn new(workers: Option<usize>) -> Result<Self> {
        let workers = match workers {
            Some(0) => return Err(Error::WorkerPool("worker count must be > 0".into())),
            Some(n) => n,
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("plant-scatter-{i}"))
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;
        debug!("Worker pool started with {} threads.", workers);
        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `task(cell, seed)` for every entry in parallel and wait for all of them.
    ///
    /// Results keep the order of `tasks`. If any task fails, one of the errors
    /// is returned and the results of the whole batch are discarded.
    pub fn drain<T, F>(&self, tasks: Vec<(usize, u64)>, task: F) -> Result<Vec<(usize, T)>>
    where
        T: Send,
        F: Fn(usize, u64) -> Result<T> + Sync + Send,
    {
        self.pool.install(|| {
            tasks
                .into_par_iter()
                .map(|(cell, seed)| task(cell, seed).map(|out| (cell, out)))
                .collect()
        })
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers())
            .finish()
    }
}
