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

//! Business records and the collection state machine.
//!
//! Collection status moves along a fixed state machine:
//!
//! ```text
//! NotRequested ──start──► Collecting ──complete──► Collected
//!       ▲                     │                        │
//!       └───────reset─────────┴────────reset───────────┘
//! ```
//!
//! The transition methods are pure in-memory guards; callers are expected
//! to invoke them while holding the business's exclusive store lock.

use crate::base::{BUSINESS_NAME_MAX_LENGTH, BusinessNumber};
use crate::error::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Data-collection status of a business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionStatus {
    /// No collection has been requested or a previous one was reset.
    NotRequested,
    /// A collection job is in flight.
    Collecting,
    /// The ledger dataset reflects a completed collection.
    Collected,
}

impl fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CollectionStatus::NotRequested => "NOT_REQUESTED",
            CollectionStatus::Collecting => "COLLECTING",
            CollectionStatus::Collected => "COLLECTED",
        };
        write!(f, "{name}")
    }
}

/// A tax-reporting business whose ledger collection lifecycle is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    number: BusinessNumber,
    name: String,
    status: CollectionStatus,
    /// Set by a collection request; cleared when the job starts. A business
    /// is "pending" for the poller while this is set and the status is
    /// still [`CollectionStatus::NotRequested`].
    requested_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Business {
    /// Creates a business in the initial `NotRequested` state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidBusinessName`] if the display name is
    /// empty or longer than [`BUSINESS_NAME_MAX_LENGTH`].
    pub fn new(number: BusinessNumber, name: impl Into<String>) -> Result<Self, EngineError> {
        let name = validate_name(name.into())?;
        let now = Utc::now();
        Ok(Business {
            number,
            name,
            status: CollectionStatus::NotRequested,
            requested_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn number(&self) -> &BusinessNumber {
        &self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> CollectionStatus {
        self.status
    }

    pub fn requested_at(&self) -> Option<DateTime<Utc>> {
        self.requested_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True when a request is outstanding and no job has picked it up yet.
    pub fn is_pending(&self) -> bool {
        self.status == CollectionStatus::NotRequested && self.requested_at.is_some()
    }

    /// Changes the display name.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), EngineError> {
        self.name = validate_name(name.into())?;
        self.touch();
        Ok(())
    }

    /// Records a collection request without changing the status; the
    /// poller discovers the business on its next tick.
    ///
    /// # Errors
    ///
    /// Conflict when a collection is already running or completed.
    pub fn request_collection(&mut self) -> Result<CollectionStatus, EngineError> {
        match self.status {
            CollectionStatus::Collecting => {
                Err(EngineError::CollectionInProgress(self.number.clone()))
            }
            CollectionStatus::Collected => Err(EngineError::AlreadyCollected(self.number.clone())),
            CollectionStatus::NotRequested => {
                self.requested_at = Some(Utc::now());
                self.touch();
                Ok(self.status)
            }
        }
    }

    /// `start` transition: legal only from `NotRequested`.
    ///
    /// Clears the request marker so a job that later fails and resets is
    /// not silently re-dispatched; a failed collection needs an explicit
    /// new request.
    ///
    /// # Errors
    ///
    /// Conflict when the business is already collecting or collected.
    pub fn start_collection(&mut self) -> Result<(), EngineError> {
        match self.status {
            CollectionStatus::NotRequested => {
                self.status = CollectionStatus::Collecting;
                self.requested_at = None;
                self.touch();
                Ok(())
            }
            CollectionStatus::Collecting => {
                Err(EngineError::CollectionInProgress(self.number.clone()))
            }
            CollectionStatus::Collected => Err(EngineError::AlreadyCollected(self.number.clone())),
        }
    }

    /// `complete` transition: legal only from `Collecting`.
    pub fn complete_collection(&mut self) -> Result<(), EngineError> {
        match self.status {
            CollectionStatus::Collecting => {
                self.status = CollectionStatus::Collected;
                self.touch();
                Ok(())
            }
            _ => Err(EngineError::NotCollecting(self.number.clone())),
        }
    }

    /// `reset` transition: legal from any state, used by the worker's
    /// failure path. Returns `false` without writing anything when the
    /// business is already `NotRequested`.
    pub fn reset_collection(&mut self) -> bool {
        if self.status == CollectionStatus::NotRequested {
            return false;
        }
        self.status = CollectionStatus::NotRequested;
        self.touch();
        true
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn validate_name(name: String) -> Result<String, EngineError> {
    if name.is_empty() || name.chars().count() > BUSINESS_NAME_MAX_LENGTH {
        return Err(EngineError::InvalidBusinessName(name));
    }
    Ok(name)
}
