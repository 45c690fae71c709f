// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The rasterization worker pool.
//!
//! A fixed set of worker threads drains a shared task queue. Tasks
//! receive their worker's index, which the rasterizer uses to address its
//! per-thread pixel-quad context. [`ThreadPool::wait_tasks_finish`] is
//! the barrier the control thread parks on after fanning out a stage.

use crossbeam_channel::{unbounded, Sender};
use log::{error, trace};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

type Task = Box<dyn FnOnce(usize) + Send + 'static>;

#[derive(Default)]
struct PendingCount {
    count: Mutex<usize>,
    zero: Condvar,
}

/// A fixed-size worker pool with a completion barrier.
pub struct ThreadPool {
    sender: Option<Sender<Task>>,
    pending: Arc<PendingCount>,
    handles: Vec<JoinHandle<()>>,
    thread_count: usize,
}

impl ThreadPool {
    /// Spawns `threads` workers, defaulting to the available hardware
    /// parallelism.
    pub fn new(threads: Option<usize>) -> Self {
        let thread_count = threads
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
            .max(1);

        let (sender, receiver) = unbounded::<Task>();
        let pending = Arc::new(PendingCount::default());

        let handles = (0..thread_count)
            .map(|worker| {
                let receiver = receiver.clone();
                let pending = Arc::clone(&pending);
                std::thread::Builder::new()
                    .name(format!("okhra-raster [{worker}]"))
                    .spawn(move || {
                        trace!("raster worker {worker} started");
                        while let Ok(task) = receiver.recv() {
                            // A panicking task must still release the
                            // barrier, or the control thread deadlocks.
                            if catch_unwind(AssertUnwindSafe(|| task(worker))).is_err() {
                                error!("raster task panicked on worker {worker}");
                            }
                            let mut count = pending.count.lock().unwrap();
                            *count -= 1;
                            if *count == 0 {
                                pending.zero.notify_all();
                            }
                        }
                    })
                    .expect("spawn raster worker")
            })
            .collect();

        Self {
            sender: Some(sender),
            pending,
            handles,
            thread_count,
        }
    }

    /// The number of workers; per-thread scratch is sized by this.
    #[inline]
    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Enqueues a task. The argument passed to the closure is the index
    /// of the worker that runs it.
    pub fn push<F>(&self, task: F)
    where
        F: FnOnce(usize) + Send + 'static,
    {
        *self.pending.count.lock().unwrap() += 1;
        if let Some(sender) = &self.sender {
            // Send only fails when the workers are gone (pool dropped).
            let _ = sender.send(Box::new(task));
        }
    }

    /// Blocks until every pushed task has completed.
    pub fn wait_tasks_finish(&self) {
        let mut count = self.pending.count.lock().unwrap();
        while *count > 0 {
            count = self.pending.zero.wait(count).unwrap();
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // Closing the channel ends the worker loops.
        self.sender.take();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_all_tasks_run_before_barrier() {
        let pool = ThreadPool::new(Some(4));
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..64 {
            let counter = Arc::clone(&counter);
            pool.push(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait_tasks_finish();
        assert_eq!(counter.load(Ordering::SeqCst), 64);
    }

    #[test]
    fn test_worker_ids_in_range() {
        let pool = ThreadPool::new(Some(3));
        let seen = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..32 {
            let seen = Arc::clone(&seen);
            pool.push(move |worker| {
                seen.lock().unwrap().push(worker);
            });
        }
        pool.wait_tasks_finish();
        assert!(seen.lock().unwrap().iter().all(|&w| w < 3));
    }

    #[test]
    fn test_barrier_survives_panicking_task() {
        let pool = ThreadPool::new(Some(2));
        pool.push(|_| panic!("boom"));
        pool.push(|_| {});
        pool.wait_tasks_finish();
    }

    #[test]
    fn test_reusable_after_barrier() {
        let pool = ThreadPool::new(Some(2));
        let counter = Arc::new(AtomicUsize::new(0));
        for round in 0..3 {
            for _ in 0..8 {
                let counter = Arc::clone(&counter);
                pool.push(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
            pool.wait_tasks_finish();
            assert_eq!(counter.load(Ordering::SeqCst), 8 * (round + 1));
        }
    }
}
