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

//! Value-added tax calculation.
//!
//! VAT is `(sales − purchases) × 1/11`, rounded half-up to an integer and
//! then half-up again to the nearest ten currency units. The two rounding
//! stages are deliberate: the second stage rounds the *already rounded*
//! integer, which diverges from a single round-to-nearest-ten on boundary
//! values (e.g. sales of 100,044 yields 9,095 then 9,100, while a single
//! stage on 9,094.9 would give 9,090).

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rust_decimal_macros::dec;

const TEN: Decimal = dec!(10);

/// Half-up rounding in the BigDecimal sense: midpoints move away from
/// zero regardless of sign.
const HALF_UP: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Computes VAT from total sales and total purchases.
///
/// The tax base (and the result) may be negative; there are no error
/// conditions and no side effects.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_collector_rs::vat;
///
/// assert_eq!(vat::calculate(dec!(10000000), dec!(5000000)), 454550);
/// assert_eq!(vat::calculate(dec!(0), dec!(1000000)), -90910);
/// ```
pub fn calculate(total_sales: Decimal, total_purchases: Decimal) -> i64 {
    let tax_base = total_sales - total_purchases;

    // 1/11 at full Decimal precision (28 significant digits).
    let vat = tax_base * (Decimal::ONE / dec!(11));

    // Stage one: round to a whole currency unit.
    let vat_rounded = vat.round_dp_with_strategy(0, HALF_UP);

    // Stage two: round the integer to the nearest ten, keeping one
    // fractional digit in between (12345 -> 1234.5 -> 1235 -> 12350).
    let result = (vat_rounded / TEN)
        .round_dp_with_strategy(1, HALF_UP)
        .round_dp_with_strategy(0, HALF_UP)
        * TEN;

    // Inputs near Decimal's limits can round past i64 range; saturate
    // rather than wrap or zero out.
    result.to_i64().unwrap_or(if result.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Computes VAT from individual entry amounts.
pub fn calculate_from_amounts(sales: &[Decimal], purchases: &[Decimal]) -> i64 {
    let total_sales: Decimal = sales.iter().sum();
    let total_purchases: Decimal = purchases.iter().sum();
    calculate(total_sales, total_purchases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        assert_eq!(calculate(dec!(10000000), dec!(5000000)), 454550);
        assert_eq!(calculate(dec!(0), dec!(1000000)), -90910);
        assert_eq!(calculate(dec!(1000000), dec!(1000000)), 0);
        assert_eq!(calculate(dec!(147945), dec!(12000)), 12360);
    }

    #[test]
    fn two_stage_rounding_on_boundary_values() {
        // 100,044 / 11 = 9,094.909... -> 9,095 -> 909.5 -> 910 -> 9,100.
        // A single round-to-nearest-ten of 9,094.9 would give 9,090.
        assert_eq!(calculate(dec!(100044), dec!(0)), 9100);
        assert_eq!(calculate(dec!(100055), dec!(0)), 9100);
    }

    #[test]
    fn zero_base_yields_zero() {
        assert_eq!(calculate(Decimal::ZERO, Decimal::ZERO), 0);
    }

    #[test]
    fn negative_base_rounds_away_from_zero() {
        // -1,000,000 / 11 = -90,909.09... -> -90,909 -> -9,090.9 -> -9,091 -> -90,910
        assert_eq!(calculate(dec!(0), dec!(1000000)), -90910);
    }

    #[test]
    fn fractional_inputs() {
        // The base is taken as given, not pre-rounded to whole units.
        assert_eq!(calculate(dec!(135796.32), dec!(0)), 12350);
    }

    #[test]
    fn saturates_at_i64_range() {
        assert_eq!(calculate(Decimal::MAX, Decimal::ZERO), i64::MAX);
        assert_eq!(calculate(Decimal::ZERO, Decimal::MAX), i64::MIN);
    }

    #[test]
    fn calculate_from_amounts_sums_first() {
        let sales = vec![dec!(5000000), dec!(5000000)];
        let purchases = vec![dec!(2500000), dec!(2500000)];
        assert_eq!(calculate_from_amounts(&sales, &purchases), 454550);
        assert_eq!(calculate_from_amounts(&[], &[]), 0);
    }
}
