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

//! Collection lifecycle engine.
//!
//! The [`Engine`] is the facade over the stores: it owns the collection
//! trigger and status reads, the state transitions the worker drives, the
//! bulk VAT calculation, and permission management. It holds no request
//! state of its own — caller identity is a parameter, never ambient.

use crate::admin::{Admin, AdminRole, PermissionDetail, PermissionGrant};
use crate::authz::AuthorizationFilter;
use crate::base::{AdminId, BusinessNumber};
use crate::business::{Business, CollectionStatus};
use crate::error::EngineError;
use crate::ledger::{EntryType, LedgerEntry};
use crate::store::{AdminStore, BusinessStore, LedgerStore, PermissionStore};
use crate::vat;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Per-business VAT result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VatReport {
    pub business_number: BusinessNumber,
    pub business_name: String,
    pub total_sales: Decimal,
    pub total_purchases: Decimal,
    pub vat_amount: i64,
}

/// Central engine coordinating businesses, ledgers, and permissions.
///
/// # Invariants
///
/// - A business's status only moves along the collection state machine.
/// - At most one collection job is in flight per business (enforced by
///   the per-business store lock around the `start` transition).
/// - Dataset replacement and the `complete` transition happen under one
///   lock, so a `Collected` status always matches its dataset.
pub struct Engine {
    businesses: Arc<BusinessStore>,
    ledger: Arc<LedgerStore>,
    permissions: Arc<PermissionStore>,
    admins: Arc<AdminStore>,
    authz: AuthorizationFilter,
}

impl Engine {
    pub fn new() -> Self {
        let businesses = Arc::new(BusinessStore::new());
        let permissions = Arc::new(PermissionStore::new());
        let authz = AuthorizationFilter::new(Arc::clone(&businesses), Arc::clone(&permissions));
        Engine {
            businesses,
            ledger: Arc::new(LedgerStore::new()),
            permissions,
            admins: Arc::new(AdminStore::new()),
            authz,
        }
    }

    // === Business records ===

    /// Registers a business.
    ///
    /// # Errors
    ///
    /// Conflict when the business number is already taken.
    pub fn create_business(
        &self,
        number: BusinessNumber,
        name: impl Into<String>,
    ) -> Result<Business, EngineError> {
        let business = Business::new(number, name)?;
        let snapshot = business.clone();
        self.businesses.insert(business)?;
        info!(number = %snapshot.number(), "business created");
        Ok(snapshot)
    }

    pub fn get_business(&self, number: &BusinessNumber) -> Result<Business, EngineError> {
        self.businesses.get(number)
    }

    pub fn list_businesses(&self) -> Vec<Business> {
        self.businesses.all()
    }

    /// Changes a business's display name.
    pub fn rename_business(
        &self,
        number: &BusinessNumber,
        name: impl Into<String>,
    ) -> Result<Business, EngineError> {
        let name = name.into();
        self.businesses.update(number, |business| {
            business.rename(name)?;
            Ok(business.clone())
        })?
    }

    // === Admins and permissions ===

    /// Registers an admin account (seeding; the engine itself only reads
    /// admins).
    pub fn register_admin(
        &self,
        username: impl Into<String>,
        role: AdminRole,
    ) -> Result<Admin, EngineError> {
        self.admins.register(username, role)
    }

    pub fn get_admin(&self, id: AdminId) -> Result<Admin, EngineError> {
        self.admins.get(id)
    }

    /// Grants a manager visibility of a business.
    ///
    /// # Errors
    ///
    /// NotFound for an unknown business or admin; Conflict when the pair
    /// is already granted.
    pub fn grant_permission(
        &self,
        number: &BusinessNumber,
        admin_id: AdminId,
    ) -> Result<PermissionGrant, EngineError> {
        self.businesses.get(number)?;
        self.admins.get(admin_id)?;
        let grant = PermissionGrant::new(number.clone(), admin_id);
        self.permissions.grant(grant.clone())?;
        info!(%number, admin = %admin_id, "permission granted");
        Ok(grant)
    }

    /// Revokes a grant; NotFound when the pair was never granted.
    pub fn revoke_permission(
        &self,
        number: &BusinessNumber,
        admin_id: AdminId,
    ) -> Result<(), EngineError> {
        self.permissions.revoke(number, admin_id)?;
        info!(%number, admin = %admin_id, "permission revoked");
        Ok(())
    }

    /// Grants for one business joined with the admins' identities: one
    /// grant read plus one bulk admin read for the whole batch, never an
    /// admin lookup per grant.
    pub fn list_permissions(
        &self,
        number: &BusinessNumber,
    ) -> Result<Vec<PermissionDetail>, EngineError> {
        self.businesses.get(number)?;
        let grants = self.permissions.by_business(number);
        let ids: Vec<AdminId> = grants.iter().map(|grant| grant.admin_id).collect();
        let admins = self.admins.get_many(&ids);

        grants
            .into_iter()
            .map(|grant| {
                let admin = admins
                    .get(&grant.admin_id)
                    .ok_or(EngineError::AdminNotFound(grant.admin_id))?;
                Ok(PermissionDetail {
                    business_number: grant.business_number,
                    admin_id: grant.admin_id,
                    admin_username: admin.username.clone(),
                    admin_role: admin.role,
                    granted_at: grant.granted_at,
                })
            })
            .collect()
    }

    pub fn authorized_business_numbers(
        &self,
        admin_id: AdminId,
        role: AdminRole,
    ) -> Vec<BusinessNumber> {
        self.authz.authorized_business_numbers(admin_id, role)
    }

    pub fn check_access(
        &self,
        number: &BusinessNumber,
        admin_id: AdminId,
        role: AdminRole,
    ) -> Result<(), EngineError> {
        self.authz.check_access(number, admin_id, role)
    }

    // === Collection lifecycle ===

    /// Records a collection request. The status stays `NotRequested`; the
    /// poller picks the business up within one interval.
    ///
    /// # Errors
    ///
    /// NotFound for an unknown business; Conflict when a collection is
    /// already running or completed.
    pub fn request_collection(
        &self,
        number: &BusinessNumber,
    ) -> Result<CollectionStatus, EngineError> {
        let status = self
            .businesses
            .update(number, |business| business.request_collection())??;
        info!(%number, "collection requested");
        Ok(status)
    }

    /// Point-in-time status read.
    pub fn collection_status(
        &self,
        number: &BusinessNumber,
    ) -> Result<CollectionStatus, EngineError> {
        Ok(self.businesses.get(number)?.status())
    }

    /// Businesses with an outstanding request awaiting a worker.
    pub fn pending_collections(&self) -> Vec<BusinessNumber> {
        self.businesses.pending()
    }

    /// `start` transition under the business's exclusive lock. Exactly
    /// one of any set of concurrent callers succeeds; the rest observe a
    /// conflict.
    pub fn start_collection(&self, number: &BusinessNumber) -> Result<(), EngineError> {
        self.businesses
            .update(number, |business| business.start_collection())??;
        info!(%number, status = %CollectionStatus::Collecting, "collection started");
        Ok(())
    }

    /// Atomically replaces the business's ledger dataset and performs the
    /// `complete` transition under one lock, so the dataset and the
    /// `Collected` status never diverge.
    pub fn complete_collection(
        &self,
        number: &BusinessNumber,
        entries: Vec<LedgerEntry>,
    ) -> Result<(), EngineError> {
        let count = entries.len();
        let ledger = Arc::clone(&self.ledger);
        self.businesses.update(number, move |business| {
            business.complete_collection()?;
            ledger.replace(business.number(), entries);
            Ok::<_, EngineError>(())
        })??;
        info!(%number, entries = count, "collection completed");
        Ok(())
    }

    /// `reset` transition for the worker's failure path. Returns whether
    /// a write happened (`false` when the status was already
    /// `NotRequested`).
    pub fn reset_collection(&self, number: &BusinessNumber) -> Result<bool, EngineError> {
        self.businesses
            .update(number, |business| business.reset_collection())
    }

    // === Ledger reads and VAT ===

    /// Current ledger dataset of one business.
    pub fn ledger_entries(&self, number: &BusinessNumber) -> Result<Vec<LedgerEntry>, EngineError> {
        self.businesses.get(number)?;
        Ok(self.ledger.entries(number))
    }

    /// Bulk VAT calculation.
    ///
    /// Performs one bulk business read and one aggregate read per entry
    /// type for the whole batch — never a read per business. An empty
    /// input yields an empty result.
    ///
    /// # Errors
    ///
    /// NotFound if any requested business does not exist.
    pub fn calculate_vat(
        &self,
        numbers: &[BusinessNumber],
    ) -> Result<Vec<VatReport>, EngineError> {
        if numbers.is_empty() {
            return Ok(Vec::new());
        }
        debug!(count = numbers.len(), "calculating vat");

        let names: HashMap<BusinessNumber, String> = self
            .businesses
            .get_many(numbers)?
            .into_iter()
            .map(|business| (business.number().clone(), business.name().to_string()))
            .collect();
        let sales = self.ledger.sum_by_type(numbers, EntryType::Sales);
        let purchases = self.ledger.sum_by_type(numbers, EntryType::Purchase);

        Ok(numbers
            .iter()
            .map(|number| {
                let total_sales = sales.get(number).copied().unwrap_or(Decimal::ZERO);
                let total_purchases = purchases.get(number).copied().unwrap_or(Decimal::ZERO);
                VatReport {
                    business_number: number.clone(),
                    business_name: names.get(number).cloned().unwrap_or_default(),
                    total_sales,
                    total_purchases,
                    vat_amount: vat::calculate(total_sales, total_purchases),
                }
            })
            .collect())
    }

    /// Authorization-scoped VAT calculation: a specific target is access
    /// checked, otherwise the caller's full authorized set is used.
    pub fn calculate_vat_for(
        &self,
        admin_id: AdminId,
        role: AdminRole,
        target: Option<&BusinessNumber>,
    ) -> Result<Vec<VatReport>, EngineError> {
        let numbers = match target {
            Some(number) => {
                self.authz.check_access(number, admin_id, role)?;
                vec![number.clone()]
            }
            None => self.authz.authorized_business_numbers(admin_id, role),
        };
        self.calculate_vat(&numbers)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
