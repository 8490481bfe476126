//! Chromosome-window operation pool
//!
//! Runs one task per chromosome on a bounded rayon pool. Results come back
//! in submission order, whatever order the tasks finish in. Cancellation is
//! cooperative: tasks poll a [`CancellationToken`] through their
//! [`TaskContext`] and the batch reports `None` when it was interrupted.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::operation::{OperationError, OperationResult};

/// Number of processed windows between two stop-flag checks
pub const DEFAULT_STOP_CHECK_INTERVAL: usize = 1024;

fn default_stop_check_interval() -> usize {
    DEFAULT_STOP_CHECK_INTERVAL
}

/// Configuration for the operation pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of worker threads (0 = rayon default)
    #[serde(default)]
    pub threads: usize,
    /// Windows processed between two polls of the stop flag
    #[serde(default = "default_stop_check_interval")]
    pub stop_check_interval: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            stop_check_interval: DEFAULT_STOP_CHECK_INTERVAL,
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_stop_check_interval(mut self, interval: usize) -> Self {
        self.stop_check_interval = interval;
        self
    }
}

/// Shared stop flag, typically owned by whoever can press "cancel"
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Re-arm the token for the next operation
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// View of the batch handed to each running task
pub struct TaskContext<'a> {
    index: usize,
    token: &'a CancellationToken,
    aborted: &'a AtomicBool,
    interrupted: &'a AtomicBool,
    stop_check_interval: usize,
}

impl TaskContext<'_> {
    /// Index of the chromosome this task is bound to
    pub fn chromosome_index(&self) -> usize {
        self.index
    }

    /// Whether the task should give up now. Observing a stop marks the
    /// whole batch as interrupted.
    pub fn is_stopped(&self) -> bool {
        let stopped = self.token.is_cancelled() || self.aborted.load(Ordering::SeqCst);
        if stopped {
            self.interrupted.store(true, Ordering::SeqCst);
        }
        stopped
    }

    /// Poll the stop flag every `stop_check_interval` steps
    pub fn checkpoint(&self, step: usize) -> bool {
        step % self.stop_check_interval == 0 && self.is_stopped()
    }
}

/// A unit of work bound to one chromosome
pub type Task<'a, R> = Box<dyn FnOnce(&TaskContext<'_>) -> OperationResult<R> + Send + 'a>;

#[derive(Debug, Default)]
struct ProgressCounter {
    done: AtomicUsize,
    total: AtomicUsize,
}

/// Tasks done over tasks submitted in the most recent batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64
        }
    }
}

enum Backend {
    Threads(rayon::ThreadPool),
    Sequential,
}

/// Bounded worker pool shared by every window operation
pub struct OperationPool {
    backend: Backend,
    progress: ProgressCounter,
    stop_check_interval: usize,
}

impl OperationPool {
    /// Build a pool with a fixed number of workers
    pub fn new(config: &PoolConfig) -> OperationResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("genplay-op-{}", i))
            .build()
            .map_err(|e| OperationError::Pool(format!("Failed to create thread pool: {}", e)))?;

        log::debug!("Created operation pool with {} workers", pool.current_num_threads());

        Ok(Self {
            backend: Backend::Threads(pool),
            progress: ProgressCounter::default(),
            stop_check_interval: config.stop_check_interval.max(1),
        })
    }

    /// Deterministic pool running every task on the calling thread, in order
    pub fn sequential() -> Self {
        Self {
            backend: Backend::Sequential,
            progress: ProgressCounter::default(),
            stop_check_interval: DEFAULT_STOP_CHECK_INTERVAL,
        }
    }

    pub fn with_stop_check_interval(mut self, interval: usize) -> Self {
        self.stop_check_interval = interval.max(1);
        self
    }

    pub fn threads(&self) -> usize {
        match &self.backend {
            Backend::Threads(pool) => pool.current_num_threads(),
            Backend::Sequential => 1,
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            done: self.progress.done.load(Ordering::Relaxed),
            total: self.progress.total.load(Ordering::Relaxed),
        }
    }

    /// Run every task and block until the batch is over.
    ///
    /// Returns `Ok(None)` when the batch was interrupted through `token`,
    /// and the first task error otherwise aborts the whole batch.
    pub fn start_pool<'a, R: Send>(
        &self,
        tasks: Vec<Task<'a, R>>,
        token: &CancellationToken,
    ) -> OperationResult<Option<Vec<R>>> {
        let total = tasks.len();
        self.progress.total.store(total, Ordering::Relaxed);
        self.progress.done.store(0, Ordering::Relaxed);

        let aborted = AtomicBool::new(false);
        let interrupted = AtomicBool::new(false);

        let run = |(index, task): (usize, Task<'a, R>)| -> OperationResult<Option<R>> {
            let ctx = TaskContext {
                index,
                token,
                aborted: &aborted,
                interrupted: &interrupted,
                stop_check_interval: self.stop_check_interval,
            };
            if ctx.is_stopped() {
                return Ok(None);
            }

            let result = task(&ctx);
            self.progress.done.fetch_add(1, Ordering::Relaxed);
            match result {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    aborted.store(true, Ordering::SeqCst);
                    Err(e)
                }
            }
        };

        let results: OperationResult<Vec<Option<R>>> = match &self.backend {
            Backend::Threads(pool) => {
                pool.install(|| tasks.into_par_iter().enumerate().map(run).collect())
            }
            Backend::Sequential => tasks.into_iter().enumerate().map(run).collect(),
        };
        let results = results?;

        if interrupted.load(Ordering::SeqCst) || results.iter().any(Option::is_none) {
            log::debug!("Operation batch of {} tasks was interrupted", total);
            return Ok(None);
        }

        log::trace!("Operation batch of {} tasks completed", total);
        Ok(Some(results.into_iter().flatten().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn squares(n: usize) -> Vec<Task<'static, usize>> {
        (0..n)
            .map(|i| -> Task<'static, usize> { Box::new(move |_ctx: &TaskContext<'_>| Ok(i * i)) })
            .collect()
    }

    #[test]
    fn test_results_follow_submission_order() {
        let pool = OperationPool::new(&PoolConfig::new().with_threads(4)).unwrap();
        let tasks: Vec<Task<'static, usize>> = (0..8)
            .map(|i| -> Task<'static, usize> {
                Box::new(move |ctx: &TaskContext<'_>| {
                    std::thread::sleep(Duration::from_millis(((8 - i) * 5) as u64));
                    Ok(ctx.chromosome_index())
                })
            })
            .collect();

        let results = pool.start_pool(tasks, &CancellationToken::new()).unwrap().unwrap();
        assert_eq!(results, (0..8).collect::<Vec<_>>());
        assert_eq!(pool.progress(), Progress { done: 8, total: 8 });
    }

    #[test]
    fn test_sequential_backend() {
        let pool = OperationPool::sequential();
        assert_eq!(pool.threads(), 1);
        let results = pool.start_pool(squares(5), &CancellationToken::new()).unwrap();
        assert_eq!(results, Some(vec![0, 1, 4, 9, 16]));
    }

    #[test]
    fn test_cancelled_batch_returns_none() {
        let pool = OperationPool::sequential();
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(pool.start_pool(squares(3), &token).unwrap(), None);

        token.reset();
        assert!(pool.start_pool(squares(3), &token).unwrap().is_some());
    }

    #[test]
    fn test_task_observing_stop_interrupts_batch() {
        let pool = OperationPool::sequential().with_stop_check_interval(1);
        let token = CancellationToken::new();
        let stopper = token.clone();
        let tasks: Vec<Task<'_, usize>> = vec![
            Box::new(|_ctx: &TaskContext<'_>| Ok(1)),
            Box::new(move |ctx: &TaskContext<'_>| {
                stopper.cancel();
                let mut done = 0;
                for step in 0..1_000 {
                    if ctx.checkpoint(step) {
                        break;
                    }
                    done += 1;
                }
                Ok(done)
            }),
        ];
        assert_eq!(pool.start_pool(tasks, &token).unwrap(), None);
    }

    #[test]
    fn test_error_aborts_batch() {
        let pool = OperationPool::new(&PoolConfig::new().with_threads(2)).unwrap();
        let tasks: Vec<Task<'static, usize>> = vec![
            Box::new(|_ctx: &TaskContext<'_>| Ok(1)),
            Box::new(|_ctx: &TaskContext<'_>| Err(OperationError::InvalidParameter("boom".to_string()))),
            Box::new(|_ctx: &TaskContext<'_>| Ok(3)),
        ];
        let err = pool.start_pool(tasks, &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, OperationError::InvalidParameter(_)));
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(Progress::default().fraction(), 0.0);
        assert_eq!(Progress { done: 1, total: 4 }.fraction(), 0.25);
    }
}
