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

//! Pricing calculator.
//!
//! Totals are computed in integer minor currency units (cents) so repeated
//! multiplication never drifts, and converted back to [`Decimal`] only for
//! output.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use hotel_reservation_rs::calculate_total_price;
//! use rust_decimal_macros::dec;
//!
//! let check_in = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let check_out = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
//! assert_eq!(calculate_total_price(dec!(100), check_in, check_out).unwrap(), dec!(200));
//! ```

use crate::error::{ReservationError, ValidationError};
use crate::stay::Stay;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

/// Decimal places of the minor currency unit.
const MINOR_UNIT_SCALE: u32 = 2;

/// Night count and total price for a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub nights: u32,
    pub total: Decimal,
}

/// `base_rate × nights` for the given dates.
///
/// # Errors
///
/// - [`ValidationError::InvalidRange`] if `check_out <= check_in`.
/// - [`ValidationError::InvalidRate`] if the rate is negative, has more than
///   two decimal places, or the total overflows.
pub fn calculate_total_price(
    base_rate: Decimal,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<Decimal, ReservationError> {
    quote(base_rate, check_in, check_out).map(|q| q.total)
}

/// Like [`calculate_total_price`] but also returns the night count.
pub fn quote(
    base_rate: Decimal,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<PriceQuote, ReservationError> {
    let stay = Stay::new(check_in, check_out)?;
    Ok(quote_stay([base_rate], &stay)?)
}

/// Sums `rate × nights` over every rate, e.g. one per room of a multi-room stay.
pub fn quote_stay(
    rates: impl IntoIterator<Item = Decimal>,
    stay: &Stay,
) -> Result<PriceQuote, ValidationError> {
    let nights = stay.nights();
    let mut total_minor: i64 = 0;
    for rate in rates {
        let line = to_minor_units(rate)?
            .checked_mul(i64::from(nights))
            .ok_or(ValidationError::InvalidRate)?;
        total_minor = total_minor
            .checked_add(line)
            .ok_or(ValidationError::InvalidRate)?;
    }
    Ok(PriceQuote {
        nights,
        total: from_minor_units(total_minor),
    })
}

/// Converts a decimal amount to whole minor units.
pub(crate) fn to_minor_units(amount: Decimal) -> Result<i64, ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::InvalidRate);
    }
    let scaled = amount
        .checked_mul(Decimal::from(10_i64.pow(MINOR_UNIT_SCALE)))
        .ok_or(ValidationError::InvalidRate)?;
    if !scaled.fract().is_zero() {
        return Err(ValidationError::InvalidRate);
    }
    scaled.to_i64().ok_or(ValidationError::InvalidRate)
}

pub(crate) fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, MINOR_UNIT_SCALE)
}
