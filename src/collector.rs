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

//! The collection worker: one job end to end.
//!
//! Pipeline: `start` transition under the business lock → simulated
//! collection latency → ingest → atomic dataset replace + `complete`.
//! Any failure after a successful `start` triggers a best-effort reset
//! back to `NotRequested`; the worker never panics its caller.

use crate::base::BusinessNumber;
use crate::config::CollectorConfig;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::ingest;
use crossbeam::channel::{Receiver, after};
use crossbeam::select;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Runs collection jobs against the engine.
pub struct Collector {
    engine: Arc<Engine>,
    config: CollectorConfig,
    shutdown: Receiver<()>,
}

impl Collector {
    /// `shutdown` is the runtime's shutdown channel; a receive (or a
    /// closed channel) interrupts the simulated latency wait.
    pub fn new(engine: Arc<Engine>, config: CollectorConfig, shutdown: Receiver<()>) -> Self {
        Collector {
            engine,
            config,
            shutdown,
        }
    }

    /// Runs one collection job.
    ///
    /// A `start` conflict aborts the job outright: the business is
    /// already collecting (or collected) and nothing was changed, so no
    /// reset happens and nothing is retried.
    ///
    /// After a successful `start`, any failure resets the status
    /// best-effort and is returned as the job outcome; a secondary
    /// failure during the reset itself is logged and swallowed.
    pub fn run(&self, number: &BusinessNumber) -> Result<(), EngineError> {
        info!(%number, "collection job started");
        self.engine.start_collection(number)?;

        if let Err(err) = self.collect(number) {
            warn!(%number, %err, "collection failed, restoring status");
            match self.engine.reset_collection(number) {
                Ok(true) => info!(%number, "collection status reset to NOT_REQUESTED"),
                Ok(false) => {}
                Err(reset_err) => {
                    error!(%number, %reset_err, "status reset failed after collection failure");
                }
            }
            return Err(err);
        }

        info!(%number, "collection job finished");
        Ok(())
    }

    fn collect(&self, number: &BusinessNumber) -> Result<(), EngineError> {
        self.simulate_collection()?;
        let entries = ingest::ingest(&self.config.data_file, number)?;
        self.engine.complete_collection(number, entries)
    }

    /// Waits out the configured collection latency. The wait is the
    /// job's only blocking point and races against the shutdown channel
    /// so the process never hangs on termination.
    fn simulate_collection(&self) -> Result<(), EngineError> {
        debug!(delay_ms = self.config.collection_delay.as_millis() as u64, "collecting");
        select! {
            recv(self.shutdown) -> _ => Err(EngineError::Interrupted),
            recv(after(self.config.collection_delay)) -> _ => Ok(()),
        }
    }
}
