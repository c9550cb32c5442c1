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

//! Collector runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

/// How often the poller looks for pending collection requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10_000);

/// Simulated latency of one collection run.
pub const DEFAULT_COLLECTION_DELAY: Duration = Duration::from_millis(300_000);

/// Resident worker threads.
pub const DEFAULT_CORE_POOL_SIZE: usize = 5;

/// Hard ceiling on worker threads (resident + transient).
pub const DEFAULT_MAX_POOL_SIZE: usize = 10;

/// Queued jobs accepted before overflow handling kicks in.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// How long shutdown waits for in-flight jobs to drain.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(60);

/// Tunables for the collection pipeline. [`Default`] carries the
/// production values; tests shrink the delays.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub poll_interval: Duration,
    pub collection_delay: Duration,
    pub core_pool_size: usize,
    pub max_pool_size: usize,
    pub queue_capacity: usize,
    pub shutdown_timeout: Duration,
    /// Tabular source every collection run ingests.
    pub data_file: PathBuf,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig {
            poll_interval: DEFAULT_POLL_INTERVAL,
            collection_delay: DEFAULT_COLLECTION_DELAY,
            core_pool_size: DEFAULT_CORE_POOL_SIZE,
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            data_file: PathBuf::from("ledger-data.csv"),
        }
    }
}
