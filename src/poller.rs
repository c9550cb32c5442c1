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

//! Fixed-interval discovery of pending collection requests.
//!
//! A single timer thread queries for businesses awaiting collection and
//! dispatches each to the worker pool. One misbehaving job never affects
//! the others or the tick itself: failures surface inside the submitted
//! closure and are only logged there.

use crate::collector::Collector;
use crate::engine::Engine;
use crate::pool::WorkerPool;
use crossbeam::channel::{Receiver, tick};
use crossbeam::select;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{info, warn};

/// One poll-and-dispatch pass: discover pending businesses and submit a
/// collection job for each.
pub fn poll_and_dispatch(engine: &Engine, collector: &Arc<Collector>, pool: &WorkerPool) {
    let pending = engine.pending_collections();
    if pending.is_empty() {
        return;
    }
    info!(count = pending.len(), "pending collection requests discovered");

    for number in pending {
        let collector = Arc::clone(collector);
        pool.submit(move || {
            // Job failures (including start conflicts with an already
            // running job) are isolated here.
            if let Err(err) = collector.run(&number) {
                warn!(%number, %err, "collection job failed");
            }
        });
    }
}

/// The timer thread driving [`poll_and_dispatch`].
pub struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawns the polling loop. It stops when the shutdown channel
    /// signals (or closes).
    pub fn spawn(
        engine: Arc<Engine>,
        collector: Arc<Collector>,
        pool: Arc<WorkerPool>,
        interval: Duration,
        shutdown: Receiver<()>,
    ) -> Self {
        let handle = thread::Builder::new()
            .name("collection-poller".into())
            .spawn(move || {
                info!(interval_ms = interval.as_millis() as u64, "collection poller started");
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(shutdown) -> _ => {
                            info!("collection poller stopping");
                            break;
                        }
                        recv(ticker) -> _ => poll_and_dispatch(&engine, &collector, &pool),
                    }
                }
            })
            .expect("failed to spawn poller thread");
        Poller { handle }
    }

    /// Waits for the polling thread to exit (after shutdown signalled).
    pub fn join(self) {
        let _ = self.handle.join();
    }
}
