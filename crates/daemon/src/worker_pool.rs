// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide pool of cooperative workers (spec §4.6): "the pool
//! guarantees no item is dropped; ordering between items is not
//! guaranteed. Stopping the pool blocks until in-flight items complete."

use parking_lot::Mutex;
use std::future::Future;
use tokio::task::JoinSet;

pub struct WorkerPool {
    tasks: Mutex<JoinSet<()>>,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Schedules `work` onto the pool. Synchronous so [`Dispatcher::process_async`]
    /// (spec §4.5, not itself async) can call it directly.
    pub fn submit<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.lock().spawn(work);
    }

    /// Drains every in-flight item before returning (spec §5
    /// "Cancellation": "stop() on the manager ... drains the worker
    /// pool"). Takes the set out of the mutex first so the await doesn't
    /// hold the lock.
    pub async fn drain(&self) {
        let mut tasks = std::mem::take(&mut *self.tasks.lock());
        while tasks.join_next().await.is_some() {}
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn submitted_work_runs_and_drain_waits_for_it() {
        let pool = WorkerPool::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let counter = Arc::clone(&counter);
            pool.submit(async move {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        pool.drain().await;
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }
}
