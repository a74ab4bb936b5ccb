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

//! Half-open date intervals for hotel stays.
//!
//! A stay occupies `[check_in, check_out)`: the guest sleeps on every night
//! from check-in up to, but not including, the check-out date. Two stays
//! collide iff `a.check_in < b.check_out && b.check_in < a.check_out`, so a
//! check-out and a check-in on the same day never conflict.

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A validated `[check_in, check_out)` interval with `check_in < check_out`.
///
/// Deserialization goes through [`Stay::new`], so an inverted or empty
/// interval never becomes a `Stay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawStay")]
pub struct Stay {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

/// Unchecked wire form of a [`Stay`].
#[derive(Deserialize)]
struct RawStay {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl TryFrom<RawStay> for Stay {
    type Error = ValidationError;

    fn try_from(raw: RawStay) -> Result<Self, Self::Error> {
        Stay::new(raw.check_in, raw.check_out)
    }
}

impl Stay {
    /// Builds a stay, rejecting empty or inverted ranges.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, ValidationError> {
        if check_out <= check_in {
            return Err(ValidationError::InvalidRange);
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Builds a stay that must not start before `today`.
    pub fn starting_from(
        check_in: NaiveDate,
        check_out: NaiveDate,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        if check_in < today {
            return Err(ValidationError::PastDate { check_in, today });
        }
        Self::new(check_in, check_out)
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Half-open overlap test.
    pub fn overlaps(&self, other: &Stay) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// Number of nights billed, at least one.
    pub fn nights(&self) -> u32 {
        // Positive by construction; only a span beyond u32 days saturates.
        let days = (self.check_out - self.check_in).num_days();
        u32::try_from(days).unwrap_or(u32::MAX).max(1)
    }
}
