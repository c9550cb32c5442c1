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

//! Admins and per-business permission grants.

use crate::base::{AdminId, BusinessNumber};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a caller. The engine treats admins as read-only input to the
/// authorization filter; identity and role are always passed explicitly
/// through the call chain, never held in ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminRole {
    /// Sees every business; grants are irrelevant.
    Admin,
    /// Sees exactly the businesses granted to them.
    Manager,
}

/// An operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: AdminId,
    pub username: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
}

/// Authorization link allowing a manager to see a specific business.
/// Unique per (business, admin) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub business_number: BusinessNumber,
    pub admin_id: AdminId,
    pub granted_at: DateTime<Utc>,
}

impl PermissionGrant {
    pub fn new(business_number: BusinessNumber, admin_id: AdminId) -> Self {
        PermissionGrant {
            business_number,
            admin_id,
            granted_at: Utc::now(),
        }
    }
}

/// A grant joined with its admin's identity, produced by the single
/// joined permission-listing read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionDetail {
    pub business_number: BusinessNumber,
    pub admin_id: AdminId,
    pub admin_username: String,
    pub admin_role: AdminRole,
    pub granted_at: DateTime<Utc>,
}
