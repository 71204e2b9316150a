//! Task-scheduling capability.

/// A parameter-less task.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Schedules tasks for execution. Callers track their own completion;
/// the pool only promises that every spawned task eventually runs.
pub trait WorkerPool: Send + Sync {
    fn spawn(&self, task: Task);
}

/// Default pool backed by rayon's global thread pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct RayonPool;

impl WorkerPool for RayonPool {
    fn spawn(&self, task: Task) {
        rayon::spawn(task);
    }
}

/// Runs every task inline on the calling thread. Deterministic; used by
/// tests and single-threaded callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialPool;

impl WorkerPool for SerialPool {
    fn spawn(&self, task: Task) {
        task();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn serial_pool_runs_inline() {
        let counter = Arc::new(AtomicUsize::new(0));
        let pool = SerialPool;
        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            pool.spawn(Box::new(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            }));
        }
        assert_eq!(counter.load(Ordering::Relaxed), 3);
    }
}
