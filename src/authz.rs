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

//! Role-scoped visibility over businesses.
//!
//! Pure read-and-decide: no persistence side effects, no ambient caller
//! state. Callers pass identity and role explicitly, and every lookup is
//! a single bulk store read — never a per-item fan-out.

use crate::admin::AdminRole;
use crate::base::{AdminId, BusinessNumber};
use crate::error::EngineError;
use crate::store::{BusinessStore, PermissionStore};
use std::sync::Arc;

/// Decides which businesses a caller may see.
#[derive(Clone)]
pub struct AuthorizationFilter {
    businesses: Arc<BusinessStore>,
    permissions: Arc<PermissionStore>,
}

impl AuthorizationFilter {
    pub fn new(businesses: Arc<BusinessStore>, permissions: Arc<PermissionStore>) -> Self {
        AuthorizationFilter {
            businesses,
            permissions,
        }
    }

    /// Business numbers the caller is allowed to see.
    ///
    /// Admins see every business; managers see exactly their granted set.
    /// Either way this is one bulk read against the relevant store.
    pub fn authorized_business_numbers(
        &self,
        admin_id: AdminId,
        role: AdminRole,
    ) -> Vec<BusinessNumber> {
        match role {
            AdminRole::Admin => self
                .businesses
                .all()
                .into_iter()
                .map(|business| business.number().clone())
                .collect(),
            AdminRole::Manager => self.permissions.business_numbers_by_admin(admin_id),
        }
    }

    /// Checks access to one specific business.
    ///
    /// # Errors
    ///
    /// [`EngineError::Forbidden`] for a manager without a grant.
    /// Authorization failures always surface; they are never downgraded
    /// to an empty result.
    pub fn check_access(
        &self,
        number: &BusinessNumber,
        admin_id: AdminId,
        role: AdminRole,
    ) -> Result<(), EngineError> {
        match role {
            AdminRole::Admin => Ok(()),
            AdminRole::Manager => {
                if self.permissions.exists(number, admin_id) {
                    Ok(())
                } else {
                    Err(EngineError::Forbidden {
                        business: number.clone(),
                        admin: admin_id,
                    })
                }
            }
        }
    }
}
