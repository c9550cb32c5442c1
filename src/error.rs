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

//! Error types for the collection engine.

use crate::base::{AdminId, BusinessNumber};
use thiserror::Error;

/// Collection engine errors.
///
/// Variants fall into four groups mirroring how callers are expected to
/// react: not-found, conflict, forbidden, and bad-request, plus
/// [`Interrupted`](EngineError::Interrupted) for a shutdown arriving while
/// a collection job is in its simulated-latency wait.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Referenced business does not exist
    #[error("business not found: {0}")]
    BusinessNotFound(BusinessNumber),

    /// Referenced admin does not exist
    #[error("admin not found: {0}")]
    AdminNotFound(AdminId),

    /// No permission grant exists for the (business, admin) pair
    #[error("permission not found: business={business}, admin={admin}")]
    PermissionNotFound {
        business: BusinessNumber,
        admin: AdminId,
    },

    /// Business number is already registered
    #[error("business already exists: {0}")]
    BusinessAlreadyExists(BusinessNumber),

    /// Admin username is already registered
    #[error("admin username already exists: {0}")]
    AdminAlreadyExists(String),

    /// The (business, admin) pair is already granted
    #[error("permission already granted: business={business}, admin={admin}")]
    PermissionAlreadyGranted {
        business: BusinessNumber,
        admin: AdminId,
    },

    /// Collection is already running for this business
    #[error("collection already in progress: {0}")]
    CollectionInProgress(BusinessNumber),

    /// Collection has already completed for this business
    #[error("collection already completed: {0}")]
    AlreadyCollected(BusinessNumber),

    /// Completion attempted while the business was not collecting
    #[error("business is not collecting: {0}")]
    NotCollecting(BusinessNumber),

    /// Caller lacks authorization for the target business
    #[error("no permission for business {business} (admin {admin})")]
    Forbidden {
        business: BusinessNumber,
        admin: AdminId,
    },

    /// Business number is not a fixed-length numeric string
    #[error("invalid business number: {0:?}")]
    InvalidBusinessNumber(String),

    /// Business name is empty or too long
    #[error("invalid business name: {0:?}")]
    InvalidBusinessName(String),

    /// Ledger entry amount is negative
    #[error("ledger amount must not be negative")]
    NegativeAmount,

    /// Data file path failed validation
    #[error("invalid data file path: {0}")]
    InvalidDataFile(String),

    /// Shutdown arrived while a collection job was waiting
    #[error("collection interrupted by shutdown")]
    Interrupted,
}
