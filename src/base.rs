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

//! Core identifier types for businesses and admins.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of digits in a business number.
pub const BUSINESS_NUMBER_LENGTH: usize = 10;

/// Maximum length of a business display name.
pub const BUSINESS_NAME_MAX_LENGTH: usize = 100;

/// Unique identifier for a business: a fixed-length numeric registration
/// number (e.g. `"1234567890"`).
///
/// The number is validated at construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BusinessNumber(String);

impl BusinessNumber {
    /// Parses and validates a business number.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidBusinessNumber`] unless the input is
    /// exactly [`BUSINESS_NUMBER_LENGTH`] ASCII digits.
    pub fn new(raw: impl Into<String>) -> Result<Self, EngineError> {
        let raw = raw.into();
        if raw.len() != BUSINESS_NUMBER_LENGTH || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EngineError::InvalidBusinessNumber(raw));
        }
        Ok(BusinessNumber(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BusinessNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AdminId(pub u64);

impl fmt::Display for AdminId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
