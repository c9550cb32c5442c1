// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Bounded worker pool for collection jobs.
//!
//! A fixed set of resident threads consumes a bounded queue. When the
//! queue is full, transient threads grow the pool up to a hard maximum;
//! past that, the job runs synchronously on the submitting thread.
//! Backpressure therefore degrades throughput instead of dropping jobs.

use crossbeam::channel::{Receiver, Sender, TrySendError, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Bounded pool with caller-runs overflow.
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    receiver: Receiver<Job>,
    workers: Vec<JoinHandle<()>>,
    transient: Arc<AtomicUsize>,
    max_transient: usize,
}

impl WorkerPool {
    /// Starts `core` resident workers over a queue of `queue_capacity`
    /// jobs; up to `max - core` transient workers absorb overflow.
    pub fn new(core: usize, max: usize, queue_capacity: usize) -> Self {
        let (sender, receiver) = bounded::<Job>(queue_capacity);

        let workers = (0..core)
            .map(|index| {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("tax-collector-{index}"))
                    .spawn(move || {
                        // Exits once the queue is closed and drained.
                        while let Ok(job) = receiver.recv() {
                            job();
                        }
                    })
                    .expect("failed to spawn worker thread")
            })
            .collect();

        info!(core, max, queue_capacity, "worker pool started");
        WorkerPool {
            sender: Some(sender),
            receiver,
            workers,
            transient: Arc::new(AtomicUsize::new(0)),
            max_transient: max.saturating_sub(core),
        }
    }

    /// Submits a job. Never drops it: queued if possible, otherwise run
    /// by a transient worker, otherwise run on the calling thread.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) {
        let Some(sender) = &self.sender else {
            job();
            return;
        };
        match sender.try_send(Box::new(job)) {
            Ok(()) => {}
            Err(TrySendError::Full(job)) => self.overflow(job),
            // Queue closed mid-shutdown; caller runs.
            Err(TrySendError::Disconnected(job)) => job(),
        }
    }

    fn overflow(&self, job: Job) {
        let grew = self
            .transient
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                (count < self.max_transient).then_some(count + 1)
            })
            .is_ok();

        if grew {
            debug!("queue full, growing pool with transient worker");
            let transient = Arc::clone(&self.transient);
            let receiver = self.receiver.clone();
            thread::spawn(move || {
                job();
                // Help drain the backlog before retiring.
                while let Ok(next) = receiver.try_recv() {
                    next();
                }
                transient.fetch_sub(1, Ordering::SeqCst);
            });
        } else {
            debug!("pool saturated, running job on submitting thread");
            job();
        }
    }

    /// Closes the queue and waits up to `timeout` for resident and
    /// transient workers to finish the jobs already accepted.
    ///
    /// Returns `false` if the pool did not drain in time; remaining
    /// threads are detached (they cannot be force-killed).
    pub fn shutdown(mut self, timeout: Duration) -> bool {
        // Closing the channel lets workers drain the queue and exit.
        drop(self.sender.take());

        let deadline = Instant::now() + timeout;
        loop {
            let drained = self.workers.iter().all(JoinHandle::is_finished)
                && self.transient.load(Ordering::SeqCst) == 0;
            if drained {
                for worker in self.workers.drain(..) {
                    let _ = worker.join();
                }
                info!("worker pool drained");
                return true;
            }
            if Instant::now() >= deadline {
                warn!("worker pool did not drain before the shutdown timeout");
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::unbounded;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn executes_submitted_jobs() {
        let pool = WorkerPool::new(2, 4, 8);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert!(pool.shutdown(Duration::from_secs(5)));
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn caller_runs_when_saturated() {
        // One worker, no transient headroom, queue of one.
        let pool = WorkerPool::new(1, 1, 1);
        let (release_tx, release_rx) = unbounded::<()>();
        let (started_tx, started_rx) = unbounded::<()>();

        // Occupy the single worker and wait until it is actually running,
        // so the next submit lands in the queue rather than overflowing.
        let blocker_rx = release_rx.clone();
        pool.submit(move || {
            started_tx.send(()).unwrap();
            let _ = blocker_rx.recv();
        });
        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker should pick the blocker up");
        // Fill the queue.
        let queued_rx = release_rx.clone();
        pool.submit(move || {
            let _ = queued_rx.recv();
        });

        // Saturated: this job must run synchronously on this thread.
        let ran_inline = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran_inline);
        pool.submit(move || {
            flag.store(true, Ordering::SeqCst);
        });
        assert!(ran_inline.load(Ordering::SeqCst));

        release_tx.send(()).unwrap();
        release_tx.send(()).unwrap();
        assert!(pool.shutdown(Duration::from_secs(5)));
    }

    #[test]
    fn transient_workers_absorb_overflow() {
        // One resident worker blocked, queue of one filled; a transient
        // worker (max 2) should still pick the third job up.
        let pool = WorkerPool::new(1, 2, 1);
        let (release_tx, release_rx) = unbounded::<()>();
        let (started_tx, started_rx) = unbounded::<()>();

        let blocker_rx = release_rx.clone();
        pool.submit(move || {
            started_tx.send(()).unwrap();
            let _ = blocker_rx.recv();
        });
        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("worker should pick the blocker up");
        let queued_rx = release_rx.clone();
        pool.submit(move || {
            let _ = queued_rx.recv();
        });

        let (done_tx, done_rx) = unbounded::<()>();
        pool.submit(move || {
            done_tx.send(()).unwrap();
        });
        // Ran on a transient thread while the resident worker is blocked.
        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("overflow job should run on a transient worker");

        release_tx.send(()).unwrap();
        release_tx.send(()).unwrap();
        assert!(pool.shutdown(Duration::from_secs(5)));
    }

    #[test]
    fn shutdown_completes_queued_jobs() {
        let pool = WorkerPool::new(1, 1, 8);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                thread::sleep(Duration::from_millis(5));
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert!(pool.shutdown(Duration::from_secs(5)));
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }
}
