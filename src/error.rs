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

//! Error types for availability search, booking and order processing.

use crate::base::{BookingId, CategoryId, MenuItemId, OrderId, RoomId};
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// Malformed or illogical input, rejected before any storage is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Check-in lies before the current date
    #[error("check-in {check_in} is in the past (today is {today})")]
    PastDate { check_in: NaiveDate, today: NaiveDate },

    /// Check-out is not strictly after check-in
    #[error("check-out must be after check-in")]
    InvalidRange,

    /// Guest count outside `1..=max`
    #[error("guest count {count} must be between 1 and {max}")]
    InvalidGuestCount { count: u32, max: u32 },

    /// Booking request names no rooms
    #[error("at least one room is required")]
    EmptyRoomList,

    /// Same room listed twice in one booking request
    #[error("room {0} listed more than once")]
    DuplicateRoom(RoomId),

    /// Rate is negative, finer than minor units, or overflows
    #[error("invalid rate (must be non-negative with at most two decimal places)")]
    InvalidRate,

    /// Order line quantity is zero
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Order has no lines
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// Menu item exists but is not currently offered
    #[error("menu item {0} is not available")]
    MenuItemUnavailable(MenuItemId),
}

/// Entity referenced by a [`ReservationError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Room(RoomId),
    Category(CategoryId),
    Booking(BookingId),
    Order(OrderId),
    MenuItem(MenuItemId),
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Room(id) => write!(f, "room {id}"),
            Entity::Category(id) => write!(f, "category {id}"),
            Entity::Booking(id) => write!(f, "booking {id}"),
            Entity::Order(id) => write!(f, "order {id}"),
            Entity::MenuItem(id) => write!(f, "menu item {id}"),
        }
    }
}

/// Reservation processing errors.
///
/// Every variant surfaces to the API boundary; none are swallowed by the core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// Input rejected before touching storage
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An active booking already overlaps the requested stay on this room
    #[error("room {room_id} is already booked for an overlapping stay")]
    RoomUnavailable { room_id: RoomId },

    /// Referenced room, category, booking, order or menu item does not exist
    #[error("{0} not found")]
    NotFound(Entity),

    /// Status move not present in the transition table
    #[error("cannot move {entity} from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },

    /// Room lock could not be acquired in time; safe to retry
    #[error("room {room_id} is busy, retry later")]
    TransientConflict { room_id: RoomId },

    /// Storage unreachable or failed; never retried on the write path
    #[error("storage failure: {0}")]
    Persistence(String),

    /// Caller's role does not permit the operation
    #[error("role {role} may not {operation}")]
    Forbidden {
        role: &'static str,
        operation: &'static str,
    },
}

impl ReservationError {
    /// Returns `true` for contention errors the conflict guard may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReservationError::TransientConflict { .. })
    }
}
