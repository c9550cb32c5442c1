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

use clap::Parser;
use csv::Writer;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tax_collector_rs::{
    AdminId, AdminRole, BusinessNumber, CollectionStatus, CollectorConfig, CollectorRuntime,
    Engine, EngineError, VatReport,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Tax Collector - VAT collection pipeline demo
///
/// Seeds a few businesses, triggers collection for each, runs the
/// poller/worker pipeline until every collection finishes, and writes
/// the resulting VAT report as CSV to stdout.
#[derive(Parser, Debug)]
#[command(name = "tax-collector-rs")]
#[command(about = "Runs the VAT collection pipeline end to end", long_about = None)]
struct Args {
    /// Path to the CSV ledger data file ingested by each collection run
    ///
    /// Expected format: type,amount,date
    /// When omitted, a small sample file is written to the temp directory.
    #[arg(value_name = "FILE")]
    data_file: Option<PathBuf>,

    /// Simulated collection latency in milliseconds
    #[arg(long, default_value_t = 2_000)]
    collection_delay_ms: u64,

    /// Poller interval in milliseconds
    #[arg(long, default_value_t = 500)]
    poll_interval_ms: u64,
}

const SAMPLE_DATA: &str = "type,amount,date\n\
                           sales,10000000,2025-07-01\n\
                           sales,4500000,2025-07-08\n\
                           purchase,5000000,2025-07-03\n\
                           purchase,1200000,2025-07-15\n";

const SEED_BUSINESSES: [(&str, &str); 3] = [
    ("1234567890", "Cafe Haven"),
    ("2345678901", "Riverside Books"),
    ("3456789012", "Uptown Hardware"),
];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let data_file = match resolve_data_file(args.data_file) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error preparing data file: {}", e);
            process::exit(1);
        }
    };

    let engine = Arc::new(Engine::new());
    let admin = match seed(&engine) {
        Ok(admin) => admin,
        Err(e) => {
            eprintln!("Error seeding demo data: {}", e);
            process::exit(1);
        }
    };

    let config = CollectorConfig {
        poll_interval: Duration::from_millis(args.poll_interval_ms),
        collection_delay: Duration::from_millis(args.collection_delay_ms),
        data_file,
        ..CollectorConfig::default()
    };

    let runtime = CollectorRuntime::start(Arc::clone(&engine), config);
    wait_for_collections(&engine, Duration::from_millis(args.collection_delay_ms * 5));
    runtime.shutdown();

    let reports = match engine.calculate_vat_for(admin, AdminRole::Admin, None) {
        Ok(reports) => reports,
        Err(e) => {
            eprintln!("Error calculating VAT: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = write_reports(&reports, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Uses the given data file or writes the bundled sample to the temp
/// directory.
fn resolve_data_file(given: Option<PathBuf>) -> Result<PathBuf, std::io::Error> {
    match given {
        Some(path) => Ok(path),
        None => {
            let path = std::env::temp_dir().join("tax-collector-demo.csv");
            std::fs::write(&path, SAMPLE_DATA)?;
            info!(path = %path.display(), "sample ledger data written");
            Ok(path)
        }
    }
}

/// Seeds the demo businesses plus one admin account, and triggers a
/// collection for every business. Returns the admin's id.
fn seed(engine: &Engine) -> Result<AdminId, EngineError> {
    let admin = engine.register_admin("admin", AdminRole::Admin)?;
    let manager = engine.register_admin("manager", AdminRole::Manager)?;

    for (raw, name) in SEED_BUSINESSES {
        let number = BusinessNumber::new(raw)?;
        engine.create_business(number.clone(), name)?;
        engine.request_collection(&number)?;
    }

    // The manager only sees the first business; the report below uses
    // the admin so every business shows up.
    engine.grant_permission(&BusinessNumber::new(SEED_BUSINESSES[0].0)?, manager.id)?;
    Ok(admin.id)
}

/// Polls statuses until every business reaches `Collected` or the
/// deadline passes.
fn wait_for_collections(engine: &Engine, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    loop {
        let done = engine
            .list_businesses()
            .iter()
            .all(|business| business.status() == CollectionStatus::Collected);
        if done {
            info!("all collections finished");
            return;
        }
        if Instant::now() >= deadline {
            info!("timed out waiting for collections, reporting current state");
            return;
        }
        thread::sleep(Duration::from_millis(100));
    }
}

/// Writes the VAT reports as CSV.
///
/// Columns: `business_number,business_name,total_sales,total_purchases,vat_amount`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
fn write_reports<W: Write>(reports: &[VatReport], writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    for report in reports {
        wtr.serialize(report)?;
    }
    wtr.flush()?;
    Ok(())
}
