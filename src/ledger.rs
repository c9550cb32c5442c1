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

//! Ledger entries: the sales and purchase records a collection produces.

use crate::base::BusinessNumber;
use crate::error::EngineError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether an entry is revenue or expenditure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Sales,
    Purchase,
}

impl EntryType {
    /// Prefix used when synthesizing a counterparty label for an ingested
    /// row (`customer3`, `supplier1`, ...).
    pub fn counterparty_prefix(self) -> &'static str {
        match self {
            EntryType::Sales => "customer",
            EntryType::Purchase => "supplier",
        }
    }
}

/// One sales or purchase record belonging to a business.
///
/// Entries live and die with the business's current dataset generation:
/// every successful collection replaces the full set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    business_number: BusinessNumber,
    entry_type: EntryType,
    amount: Decimal,
    counterparty: Option<String>,
    transaction_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Creates an entry, rejecting negative amounts.
    pub fn new(
        business_number: BusinessNumber,
        entry_type: EntryType,
        amount: Decimal,
        counterparty: Option<String>,
        transaction_date: NaiveDate,
    ) -> Result<Self, EngineError> {
        if amount < Decimal::ZERO {
            return Err(EngineError::NegativeAmount);
        }
        Ok(LedgerEntry {
            business_number,
            entry_type,
            amount,
            counterparty,
            transaction_date,
            created_at: Utc::now(),
        })
    }

    pub fn business_number(&self) -> &BusinessNumber {
        &self.business_number
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn counterparty(&self) -> Option<&str> {
        self.counterparty.as_deref()
    }

    pub fn transaction_date(&self) -> NaiveDate {
        self.transaction_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn number() -> BusinessNumber {
        BusinessNumber::new("1234567890").unwrap()
    }

    #[test]
    fn accepts_zero_and_positive_amounts() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        LedgerEntry::new(number(), EntryType::Sales, Decimal::ZERO, None, date).unwrap();
        let entry =
            LedgerEntry::new(number(), EntryType::Purchase, dec!(150000.50), None, date).unwrap();
        assert_eq!(entry.amount(), dec!(150000.50));
        assert_eq!(entry.entry_type(), EntryType::Purchase);
    }

    #[test]
    fn rejects_negative_amount() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let result = LedgerEntry::new(number(), EntryType::Sales, dec!(-1), None, date);
        assert_eq!(result, Err(EngineError::NegativeAmount));
    }

    #[test]
    fn counterparty_prefixes() {
        assert_eq!(EntryType::Sales.counterparty_prefix(), "customer");
        assert_eq!(EntryType::Purchase.counterparty_prefix(), "supplier");
    }
}
