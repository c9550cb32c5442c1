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

//! In-memory concurrent stores.
//!
//! Each store exposes exactly the collaborator contract the engine
//! requires (bulk reads, atomic replace, exclusive per-business locking)
//! so a persistent backend could be slotted in behind the same shapes.
//!
//! # Locking
//!
//! [`BusinessStore::update`] is the exclusive per-business lock primitive:
//! every business record lives behind its own [`Mutex`], and all
//! mutations run as closures under that lock. Distinct businesses never
//! contend; per-business ordering is total.

use crate::admin::{Admin, AdminRole, PermissionGrant};
use crate::base::{AdminId, BusinessNumber};
use crate::business::Business;
use crate::error::EngineError;
use crate::ledger::{EntryType, LedgerEntry};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Business records indexed by business number, each behind its own lock.
#[derive(Debug, Default)]
pub struct BusinessStore {
    inner: DashMap<BusinessNumber, Arc<Mutex<Business>>>,
}

impl BusinessStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new business.
    ///
    /// # Errors
    ///
    /// [`EngineError::BusinessAlreadyExists`] if the number is taken. The
    /// entry API makes the check-and-insert atomic.
    pub fn insert(&self, business: Business) -> Result<(), EngineError> {
        match self.inner.entry(business.number().clone()) {
            Entry::Occupied(_) => Err(EngineError::BusinessAlreadyExists(
                business.number().clone(),
            )),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(business)));
                Ok(())
            }
        }
    }

    /// Point-in-time snapshot of one business.
    pub fn get(&self, number: &BusinessNumber) -> Result<Business, EngineError> {
        let slot = self
            .inner
            .get(number)
            .ok_or_else(|| EngineError::BusinessNotFound(number.clone()))?;
        let business = slot.lock().clone();
        Ok(business)
    }

    /// Bulk snapshot read; fails with the first missing number.
    pub fn get_many(&self, numbers: &[BusinessNumber]) -> Result<Vec<Business>, EngineError> {
        numbers.iter().map(|number| self.get(number)).collect()
    }

    /// Snapshots of every business.
    pub fn all(&self) -> Vec<Business> {
        self.inner.iter().map(|slot| slot.value().lock().clone()).collect()
    }

    /// Runs `f` on the business record under its exclusive lock.
    ///
    /// This is the lock/read/write primitive the collection worker builds
    /// its transitions on: everything inside the closure is atomic with
    /// respect to any other mutation of the same business.
    pub fn update<R>(
        &self,
        number: &BusinessNumber,
        f: impl FnOnce(&mut Business) -> R,
    ) -> Result<R, EngineError> {
        let slot = self
            .inner
            .get(number)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| EngineError::BusinessNotFound(number.clone()))?;
        let mut business = slot.lock();
        Ok(f(&mut business))
    }

    /// Businesses with an outstanding collection request that no job has
    /// picked up yet, in no particular order.
    pub fn pending(&self) -> Vec<BusinessNumber> {
        self.inner
            .iter()
            .filter(|slot| slot.value().lock().is_pending())
            .map(|slot| slot.key().clone())
            .collect()
    }
}

/// Ledger entries grouped by owning business.
///
/// The whole per-business vector is swapped on replace, so readers see
/// either the previous generation or the new one, never a mix.
#[derive(Debug, Default)]
pub struct LedgerStore {
    inner: DashMap<BusinessNumber, Vec<LedgerEntry>>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deletes every existing entry for the business and inserts the new
    /// set in one atomic step. An empty `entries` leaves the dataset empty.
    pub fn replace(&self, number: &BusinessNumber, entries: Vec<LedgerEntry>) {
        self.inner.insert(number.clone(), entries);
    }

    /// All entries currently owned by the business.
    pub fn entries(&self, number: &BusinessNumber) -> Vec<LedgerEntry> {
        self.inner
            .get(number)
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Bulk aggregate: amount sums for a batch of businesses, keyed by
    /// business number. One call covers the whole batch — callers must
    /// never loop this per id.
    ///
    /// Businesses without entries of the given type are absent from the
    /// result; callers default them to zero.
    pub fn sum_by_type(
        &self,
        numbers: &[BusinessNumber],
        entry_type: EntryType,
    ) -> HashMap<BusinessNumber, Decimal> {
        let mut sums = HashMap::with_capacity(numbers.len());
        for number in numbers {
            if let Some(entries) = self.inner.get(number) {
                let total: Decimal = entries
                    .iter()
                    .filter(|entry| entry.entry_type() == entry_type)
                    .map(|entry| entry.amount())
                    .sum();
                sums.insert(number.clone(), total);
            }
        }
        sums
    }
}

/// Permission grants keyed by (business, admin) pair.
#[derive(Debug, Default)]
pub struct PermissionStore {
    inner: DashMap<(BusinessNumber, AdminId), PermissionGrant>,
}

impl PermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a grant; the pair is unique.
    ///
    /// # Errors
    ///
    /// [`EngineError::PermissionAlreadyGranted`] on a duplicate pair.
    pub fn grant(&self, grant: PermissionGrant) -> Result<(), EngineError> {
        let key = (grant.business_number.clone(), grant.admin_id);
        match self.inner.entry(key) {
            Entry::Occupied(_) => Err(EngineError::PermissionAlreadyGranted {
                business: grant.business_number,
                admin: grant.admin_id,
            }),
            Entry::Vacant(entry) => {
                entry.insert(grant);
                Ok(())
            }
        }
    }

    /// Removes a grant.
    ///
    /// # Errors
    ///
    /// [`EngineError::PermissionNotFound`] if the pair was never granted.
    pub fn revoke(&self, number: &BusinessNumber, admin_id: AdminId) -> Result<(), EngineError> {
        self.inner
            .remove(&(number.clone(), admin_id))
            .map(|_| ())
            .ok_or_else(|| EngineError::PermissionNotFound {
                business: number.clone(),
                admin: admin_id,
            })
    }

    pub fn exists(&self, number: &BusinessNumber, admin_id: AdminId) -> bool {
        self.inner.contains_key(&(number.clone(), admin_id))
    }

    /// All grants for one business.
    pub fn by_business(&self, number: &BusinessNumber) -> Vec<PermissionGrant> {
        self.inner
            .iter()
            .filter(|entry| &entry.key().0 == number)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Business numbers granted to one admin, in one read.
    pub fn business_numbers_by_admin(&self, admin_id: AdminId) -> Vec<BusinessNumber> {
        self.inner
            .iter()
            .filter(|entry| entry.key().1 == admin_id)
            .map(|entry| entry.key().0.clone())
            .collect()
    }
}

/// Operator accounts. Read-only from the engine pipeline's perspective;
/// registration exists for seeding and tests.
#[derive(Debug, Default)]
pub struct AdminStore {
    inner: DashMap<AdminId, Admin>,
    usernames: DashMap<String, AdminId>,
    next_id: AtomicU64,
}

impl AdminStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an admin with a unique username and returns it with its
    /// assigned id.
    ///
    /// # Errors
    ///
    /// [`EngineError::AdminAlreadyExists`] when the username is taken.
    pub fn register(
        &self,
        username: impl Into<String>,
        role: AdminRole,
    ) -> Result<Admin, EngineError> {
        let username = username.into();
        match self.usernames.entry(username.clone()) {
            Entry::Occupied(_) => Err(EngineError::AdminAlreadyExists(username)),
            Entry::Vacant(entry) => {
                let id = AdminId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
                let admin = Admin {
                    id,
                    username,
                    role,
                    created_at: chrono::Utc::now(),
                };
                entry.insert(id);
                self.inner.insert(id, admin.clone());
                Ok(admin)
            }
        }
    }

    pub fn get(&self, id: AdminId) -> Result<Admin, EngineError> {
        self.inner
            .get(&id)
            .map(|admin| admin.clone())
            .ok_or(EngineError::AdminNotFound(id))
    }

    /// Bulk read for a batch of ids, keyed by id. One call covers the
    /// whole batch — callers must never loop [`get`](Self::get) per id.
    /// Unknown ids are absent from the result.
    pub fn get_many(&self, ids: &[AdminId]) -> HashMap<AdminId, Admin> {
        ids.iter()
            .filter_map(|id| self.inner.get(id).map(|admin| (*id, admin.clone())))
            .collect()
    }

    pub fn find_by_username(&self, username: &str) -> Option<Admin> {
        let id = *self.usernames.get(username)?;
        self.inner.get(&id).map(|admin| admin.clone())
    }
}
