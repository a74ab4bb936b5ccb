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

//! Status lifecycles driven by static transition tables.
//!
//! Bookings and food orders share the same mechanism: each status lists its
//! legal successors and [`transition`] rejects anything else, leaving the
//! caller's record untouched.
//!
//! ```text
//!  pending_payment ──pay──► confirmed ──check in──► checked_in ──check out──► checked_out
//!        │                     │
//!        └──────cancel─────────┴──────────────► cancelled
//! ```

use crate::error::ReservationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A status enum whose legal moves are a fixed table.
pub trait Lifecycle: Copy + Eq + fmt::Debug + 'static {
    /// Entity name used in transition errors.
    const ENTITY: &'static str;

    fn as_str(self) -> &'static str;

    /// Statuses reachable in one step.
    fn successors(self) -> &'static [Self];

    fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    fn can_transition_to(self, next: Self) -> bool {
        self.successors().contains(&next)
    }
}

/// Validates `from → to` against the table, returning the new status.
///
/// # Errors
///
/// [`ReservationError::InvalidTransition`] when the move is not in the table.
pub fn transition<S: Lifecycle>(from: S, to: S) -> Result<S, ReservationError> {
    if from.can_transition_to(to) {
        Ok(to)
    } else {
        Err(ReservationError::InvalidTransition {
            entity: S::ENTITY,
            from: from.as_str(),
            to: to.as_str(),
        })
    }
}

/// Unrecognised status text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct ParseStatusError(pub String);

/// Booking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    PendingPayment,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl BookingStatus {
    /// Active bookings occupy their rooms for overlap purposes.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            BookingStatus::PendingPayment | BookingStatus::Confirmed | BookingStatus::CheckedIn
        )
    }

    /// Statuses a booking may be created in.
    pub fn is_initial(self) -> bool {
        matches!(self, BookingStatus::PendingPayment | BookingStatus::Confirmed)
    }
}

impl Lifecycle for BookingStatus {
    const ENTITY: &'static str = "booking";

    fn as_str(self) -> &'static str {
        match self {
            BookingStatus::PendingPayment => "pending_payment",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::CheckedOut => "checked_out",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    fn successors(self) -> &'static [Self] {
        use BookingStatus::*;
        match self {
            PendingPayment => &[Confirmed, Cancelled],
            Confirmed => &[CheckedIn, Cancelled],
            CheckedIn => &[CheckedOut],
            CheckedOut | Cancelled => &[],
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending_payment" => Ok(BookingStatus::PendingPayment),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "checked_in" => Ok(BookingStatus::CheckedIn),
            "checked_out" => Ok(BookingStatus::CheckedOut),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}
