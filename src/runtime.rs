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

//! Wiring of the background collection pipeline.
//!
//! One poller thread feeds a bounded worker pool; a single shutdown
//! channel interrupts both the poller loop and any worker sitting in the
//! simulated-latency wait, then the pool drains within a bounded timeout.

use crate::collector::Collector;
use crate::config::CollectorConfig;
use crate::engine::Engine;
use crate::poller::Poller;
use crate::pool::WorkerPool;
use crossbeam::channel::{Sender, bounded};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Running collection pipeline: poller + pool + shutdown signalling.
pub struct CollectorRuntime {
    pool: Arc<WorkerPool>,
    poller: Poller,
    shutdown_tx: Sender<()>,
    drain_timeout: Duration,
}

impl CollectorRuntime {
    /// Starts the pool and the poller against the given engine.
    pub fn start(engine: Arc<Engine>, config: CollectorConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        let pool = Arc::new(WorkerPool::new(
            config.core_pool_size,
            config.max_pool_size,
            config.queue_capacity,
        ));
        let drain_timeout = config.shutdown_timeout;
        let poll_interval = config.poll_interval;
        let collector = Arc::new(Collector::new(
            Arc::clone(&engine),
            config,
            shutdown_rx.clone(),
        ));
        let poller = Poller::spawn(
            engine,
            collector,
            Arc::clone(&pool),
            poll_interval,
            shutdown_rx,
        );
        CollectorRuntime {
            pool,
            poller,
            shutdown_tx,
            drain_timeout,
        }
    }

    /// Graceful shutdown: wake every waiter, stop the poller, then drain
    /// the pool up to the configured timeout. Jobs interrupted in their
    /// latency wait reset their business and finish quickly.
    pub fn shutdown(self) {
        info!("collector runtime shutting down");
        // Closing the channel wakes the poller and all delay waits.
        drop(self.shutdown_tx);
        self.poller.join();

        match Arc::try_unwrap(self.pool) {
            Ok(pool) => {
                if !pool.shutdown(self.drain_timeout) {
                    warn!("collection jobs still running after drain timeout");
                }
            }
            // Shouldn't happen: the poller held the only other reference.
            Err(_) => warn!("worker pool still referenced, skipping drain"),
        }
        info!("collector runtime stopped");
    }
}
