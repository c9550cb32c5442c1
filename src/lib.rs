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

//! # Tax Collector
//!
//! This library tracks per-business tax data collection jobs and computes
//! value-added tax from the collected ledger, with role-scoped
//! visibility.
//!
//! ## Core Components
//!
//! - [`Engine`]: facade over businesses, ledgers, and permissions —
//!   collection triggers, status reads, bulk VAT, authorization
//! - [`Business`]: a business record owning its collection state machine
//! - [`CollectorRuntime`]: background pipeline (poller → bounded worker
//!   pool → collection worker)
//! - [`vat`]: the two-stage half-up VAT rounding calculation
//! - [`EngineError`]: error taxonomy (not-found / conflict / forbidden /
//!   bad-request)
//!
//! ## Example
//!
//! ```
//! use tax_collector_rs::{BusinessNumber, CollectionStatus, Engine};
//!
//! let engine = Engine::new();
//! let number = BusinessNumber::new("1234567890").unwrap();
//! engine.create_business(number.clone(), "Cafe Haven").unwrap();
//!
//! // Record a collection request; the poller picks it up asynchronously.
//! engine.request_collection(&number).unwrap();
//! assert_eq!(
//!     engine.collection_status(&number).unwrap(),
//!     CollectionStatus::NotRequested
//! );
//! ```
//!
//! ## Concurrency
//!
//! Every business record sits behind its own lock; the `start` transition
//! runs under it, so at most one collection is ever in flight per
//! business while distinct businesses proceed fully in parallel.

pub mod admin;
pub mod authz;
pub mod base;
pub mod business;
pub mod collector;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod ledger;
pub mod poller;
pub mod pool;
pub mod runtime;
pub mod store;
pub mod vat;

pub use admin::{Admin, AdminRole, PermissionDetail, PermissionGrant};
pub use authz::AuthorizationFilter;
pub use base::{AdminId, BusinessNumber};
pub use business::{Business, CollectionStatus};
pub use collector::Collector;
pub use config::CollectorConfig;
pub use engine::{Engine, VatReport};
pub use error::EngineError;
pub use ledger::{EntryType, LedgerEntry};
pub use poller::Poller;
pub use pool::WorkerPool;
pub use runtime::CollectorRuntime;
