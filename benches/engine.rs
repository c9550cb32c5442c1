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

//! Benchmarks for the collection engine.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - The VAT rounding calculation itself
//! - Bulk VAT report generation as the business count grows
//! - Collection lifecycle transitions under the per-business lock
//! - CSV ledger ingestion throughput

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Cursor;
use tax_collector_rs::{
    BusinessNumber, Engine, EntryType, LedgerEntry, ingest, vat,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn make_number(i: u64) -> BusinessNumber {
    BusinessNumber::new(format!("{:010}", 1_000_000_000 + i)).unwrap()
}

fn make_entry(n: &BusinessNumber, entry_type: EntryType, amount: Decimal) -> LedgerEntry {
    LedgerEntry::new(
        n.clone(),
        entry_type,
        amount,
        None,
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
    )
    .unwrap()
}

/// Engine with `count` collected businesses, two entries each.
fn engine_with_businesses(count: u64) -> (Engine, Vec<BusinessNumber>) {
    let engine = Engine::new();
    let numbers: Vec<_> = (0..count).map(make_number).collect();
    for n in &numbers {
        engine.create_business(n.clone(), "Bench Business").unwrap();
        engine.request_collection(n).unwrap();
        engine.start_collection(n).unwrap();
        engine
            .complete_collection(
                n,
                vec![
                    make_entry(n, EntryType::Sales, dec!(10000000)),
                    make_entry(n, EntryType::Purchase, dec!(5000000)),
                ],
            )
            .unwrap();
    }
    (engine, numbers)
}

fn csv_data(rows: usize) -> String {
    let mut data = String::from("type,amount,date\n");
    for i in 0..rows {
        let kind = if i % 2 == 0 { "sales" } else { "purchase" };
        data.push_str(&format!("{kind},{},2025-07-01\n", 1000 + i));
    }
    data
}

// =============================================================================
// VAT Calculation Benchmarks
// =============================================================================

fn bench_vat_calculation(c: &mut Criterion) {
    c.bench_function("vat_calculate", |b| {
        b.iter(|| vat::calculate(black_box(dec!(10000000)), black_box(dec!(5000000))))
    });
}

fn bench_vat_from_amounts(c: &mut Criterion) {
    let mut group = c.benchmark_group("vat_from_amounts");

    for count in [10u64, 100, 1_000].iter() {
        let sales: Vec<Decimal> = (0..*count).map(Decimal::from).collect();
        let purchases: Vec<Decimal> = (0..*count / 2).map(Decimal::from).collect();

        group.throughput(Throughput::Elements(*count));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| vat::calculate_from_amounts(black_box(&sales), black_box(&purchases)))
        });
    }
    group.finish();
}

// =============================================================================
// Bulk Report Benchmarks
// =============================================================================

fn bench_bulk_vat_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_vat_report");

    for count in [10u64, 100, 1_000].iter() {
        let (engine, numbers) = engine_with_businesses(*count);

        group.throughput(Throughput::Elements(*count));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                let reports = engine.calculate_vat(black_box(&numbers)).unwrap();
                black_box(reports);
            })
        });
    }
    group.finish();
}

// =============================================================================
// Lifecycle Benchmarks
// =============================================================================

fn bench_collection_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_lifecycle");

    group.bench_function("request", |b| {
        let engine = Engine::new();
        let n = make_number(1);
        engine.create_business(n.clone(), "Bench Business").unwrap();
        b.iter(|| {
            engine.request_collection(&n).unwrap();
            engine.start_collection(&n).unwrap();
            engine.reset_collection(&n).unwrap();
        })
    });

    group.bench_function("full_cycle", |b| {
        let engine = Engine::new();
        let n = make_number(2);
        engine.create_business(n.clone(), "Bench Business").unwrap();
        b.iter(|| {
            engine.request_collection(&n).unwrap();
            engine.start_collection(&n).unwrap();
            engine
                .complete_collection(&n, vec![make_entry(&n, EntryType::Sales, dec!(100))])
                .unwrap();
            engine.reset_collection(&n).unwrap();
        })
    });

    group.finish();
}

fn bench_pending_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("pending_scan");

    for count in [100u64, 1_000, 10_000].iter() {
        let engine = Engine::new();
        for i in 0..*count {
            let n = make_number(i);
            engine.create_business(n.clone(), "Bench Business").unwrap();
            if i % 10 == 0 {
                engine.request_collection(&n).unwrap();
            }
        }

        group.throughput(Throughput::Elements(*count));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| black_box(engine.pending_collections()))
        });
    }
    group.finish();
}

// =============================================================================
// Ingest Benchmarks
// =============================================================================

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");
    let n = make_number(1);

    for rows in [100, 1_000, 10_000].iter() {
        let data = csv_data(*rows);

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), rows, |b, _| {
            b.iter(|| {
                let entries = ingest::ingest_reader(Cursor::new(data.as_bytes()), &n);
                black_box(entries);
            })
        });
    }
    group.finish();
}

// =============================================================================
// Criterion Groups
// =============================================================================

criterion_group!(vat_benches, bench_vat_calculation, bench_vat_from_amounts,);

criterion_group!(report_benches, bench_bulk_vat_report,);

criterion_group!(
    lifecycle_benches,
    bench_collection_lifecycle,
    bench_pending_scan,
);

criterion_group!(ingest_benches, bench_ingest,);

criterion_main!(vat_benches, report_benches, lifecycle_benches, ingest_benches);
