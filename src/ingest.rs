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

//! Ledger data ingestion from a tabular CSV source.
//!
//! Expected columns: `type,amount,date` with a header row. `type` is
//! `sales` or `purchase`; together the rows of one type form that
//! section of the source.
//!
//! Row policy (reproduced from the upstream data feed):
//! - a row without a parseable amount is skipped, never fatal
//! - a missing or unparseable date defaults to today
//! - the counterparty label is synthesized from the entry's 1-based
//!   position among the accepted entries of its section (`customer1`,
//!   `supplier3`, ...); skipped rows consume no position
//!
//! A missing source file yields an empty dataset, not an error.

use crate::base::BusinessNumber;
use crate::error::EngineError;
use crate::ledger::{EntryType, LedgerEntry};
use chrono::{NaiveDate, Utc};
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Raw CSV record matching the source format.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    amount: Option<Decimal>,
    #[serde(default)]
    date: Option<String>,
}

impl CsvRow {
    fn entry_type(&self) -> Option<EntryType> {
        match self.entry_type.to_lowercase().as_str() {
            "sales" => Some(EntryType::Sales),
            "purchase" => Some(EntryType::Purchase),
            _ => None,
        }
    }

    fn date(&self) -> NaiveDate {
        self.date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Parses the data file into ledger entries for one business.
///
/// # Errors
///
/// [`EngineError::InvalidDataFile`] when the path fails validation
/// (empty, traversal patterns, or not a `.csv`). A valid path pointing at
/// a file that does not exist returns `Ok(vec![])`.
pub fn ingest(path: &Path, business: &BusinessNumber) -> Result<Vec<LedgerEntry>, EngineError> {
    validate_path(path)?;

    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            warn!(path = %path.display(), %err, "data file not readable, ingesting empty dataset");
            return Ok(Vec::new());
        }
    };

    info!(path = %path.display(), %business, "parsing ledger data file");
    Ok(ingest_reader(BufReader::new(file), business))
}

/// Streaming parse of the CSV source. Row-level failures are logged and
/// skipped; they never abort the whole ingest.
pub fn ingest_reader<R: Read>(reader: R, business: &BusinessNumber) -> Vec<LedgerEntry> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let mut entries = Vec::new();
    let mut sales_position = 0usize;
    let mut purchase_position = 0usize;

    for (row_index, result) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                warn!(row = row_index + 1, %err, "skipping malformed row");
                continue;
            }
        };

        let Some(entry_type) = row.entry_type() else {
            warn!(row = row_index + 1, kind = %row.entry_type, "skipping row with unknown type");
            continue;
        };
        let Some(amount) = row.amount else {
            debug!(row = row_index + 1, "skipping row without amount");
            continue;
        };

        // Skipped rows never consume a section slot: the position counts
        // accepted entries only.
        let position = match entry_type {
            EntryType::Sales => sales_position + 1,
            EntryType::Purchase => purchase_position + 1,
        };
        let counterparty = format!("{}{position}", entry_type.counterparty_prefix());

        match LedgerEntry::new(
            business.clone(),
            entry_type,
            amount,
            Some(counterparty),
            row.date(),
        ) {
            Ok(entry) => {
                entries.push(entry);
                match entry_type {
                    EntryType::Sales => sales_position += 1,
                    EntryType::Purchase => purchase_position += 1,
                }
            }
            // Negative amounts land here.
            Err(err) => warn!(row = row_index + 1, %err, "skipping invalid row"),
        }
    }

    info!(
        %business,
        total = entries.len(),
        sales = sales_position,
        purchases = purchase_position,
        "ledger ingest finished"
    );
    entries
}

/// Rejects empty paths, traversal patterns, and non-CSV extensions.
fn validate_path(path: &Path) -> Result<(), EngineError> {
    let raw = path.to_string_lossy();
    if raw.trim().is_empty() {
        return Err(EngineError::InvalidDataFile("empty path".into()));
    }
    for pattern in ["..", "./", ".\\"] {
        if raw.contains(pattern) {
            warn!(path = %raw, "path traversal pattern rejected");
            return Err(EngineError::InvalidDataFile(raw.into_owned()));
        }
    }
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(EngineError::InvalidDataFile(raw.into_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn number() -> BusinessNumber {
        BusinessNumber::new("1234567890").unwrap()
    }

    #[test]
    fn parses_both_sections() {
        let csv = "type,amount,date\n\
                   sales,1000000,2025-07-01\n\
                   sales,2000000,2025-07-02\n\
                   purchase,500000,2025-07-03\n";
        let entries = ingest_reader(Cursor::new(csv), &number());

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].entry_type(), EntryType::Sales);
        assert_eq!(entries[0].amount(), dec!(1000000));
        assert_eq!(entries[0].counterparty(), Some("customer1"));
        assert_eq!(entries[1].counterparty(), Some("customer2"));
        assert_eq!(entries[2].entry_type(), EntryType::Purchase);
        assert_eq!(entries[2].counterparty(), Some("supplier1"));
    }

    #[test]
    fn section_positions_are_independent() {
        let csv = "type,amount,date\n\
                   purchase,1,2025-07-01\n\
                   sales,2,2025-07-01\n\
                   purchase,3,2025-07-01\n\
                   sales,4,2025-07-01\n";
        let entries = ingest_reader(Cursor::new(csv), &number());

        let labels: Vec<_> = entries.iter().map(|e| e.counterparty().unwrap()).collect();
        assert_eq!(labels, vec!["supplier1", "customer1", "supplier2", "customer2"]);
    }

    #[test]
    fn skips_rows_without_amount() {
        let csv = "type,amount,date\n\
                   sales,,2025-07-01\n\
                   sales,not-a-number,2025-07-01\n\
                   sales,300,2025-07-01\n";
        let entries = ingest_reader(Cursor::new(csv), &number());

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount(), dec!(300));
        assert_eq!(entries[0].counterparty(), Some("customer1"));
    }

    #[test]
    fn skips_negative_amounts_and_unknown_types() {
        let csv = "type,amount,date\n\
                   sales,-50,2025-07-01\n\
                   refund,100,2025-07-01\n\
                   sales,100,2025-07-01\n\
                   purchase,100,2025-07-01\n";
        let entries = ingest_reader(Cursor::new(csv), &number());

        assert_eq!(entries.len(), 2);
        // Skipped rows (negative amount, unknown type) consume no
        // section position: the first accepted sales row is customer1.
        assert_eq!(entries[0].entry_type(), EntryType::Sales);
        assert_eq!(entries[0].counterparty(), Some("customer1"));
        assert_eq!(entries[1].entry_type(), EntryType::Purchase);
        assert_eq!(entries[1].counterparty(), Some("supplier1"));
    }

    #[test]
    fn date_defaults_to_today_when_missing_or_invalid() {
        let csv = "type,amount,date\n\
                   sales,100,\n\
                   sales,200,07/01/2025\n\
                   sales,300,2025-07-01\n";
        let entries = ingest_reader(Cursor::new(csv), &number());

        let today = Utc::now().date_naive();
        assert_eq!(entries[0].transaction_date(), today);
        assert_eq!(entries[1].transaction_date(), today);
        assert_eq!(
            entries[2].transaction_date(),
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
        );
    }

    #[test]
    fn missing_file_yields_empty_dataset() {
        let path = PathBuf::from("/nonexistent/ledger-data.csv");
        let entries = ingest(&path, &number()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn rejects_invalid_paths() {
        assert!(matches!(
            ingest(Path::new(""), &number()),
            Err(EngineError::InvalidDataFile(_))
        ));
        assert!(matches!(
            ingest(Path::new("/data/../etc/ledger.csv"), &number()),
            Err(EngineError::InvalidDataFile(_))
        ));
        assert!(matches!(
            ingest(Path::new("/data/ledger.xlsx"), &number()),
            Err(EngineError::InvalidDataFile(_))
        ));
    }

    #[test]
    fn whitespace_in_fields_is_trimmed() {
        let csv = "type,amount,date\n sales , 100 , 2025-07-01 \n";
        let entries = ingest_reader(Cursor::new(csv), &number());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount(), dec!(100));
    }
}
