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

//! Role-based permissions.
//!
//! The identity layer authenticates callers and hands over an [`Identity`];
//! this module only answers whether that identity's role may perform an
//! [`Operation`]. The mapping is a static table per role.

use crate::base::GuestId;
use crate::error::ReservationError;
use crate::lifecycle::BookingStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Guest,
    Staff,
    Manager,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    SearchRooms,
    ViewRoom,
    CreateBooking,
    CancelBooking,
    ConfirmBooking,
    CheckIn,
    CheckOut,
    ManageRooms,
    PlaceOrder,
    ManageOrders,
}

const GUEST_OPERATIONS: &[Operation] = &[
    Operation::SearchRooms,
    Operation::ViewRoom,
    Operation::CreateBooking,
    Operation::CancelBooking,
    Operation::PlaceOrder,
];

const STAFF_OPERATIONS: &[Operation] = &[
    Operation::SearchRooms,
    Operation::ViewRoom,
    Operation::CreateBooking,
    Operation::CancelBooking,
    Operation::ConfirmBooking,
    Operation::CheckIn,
    Operation::CheckOut,
    Operation::PlaceOrder,
    Operation::ManageOrders,
];

const MANAGER_OPERATIONS: &[Operation] = &[
    Operation::SearchRooms,
    Operation::ViewRoom,
    Operation::CreateBooking,
    Operation::CancelBooking,
    Operation::ConfirmBooking,
    Operation::CheckIn,
    Operation::CheckOut,
    Operation::ManageRooms,
    Operation::PlaceOrder,
    Operation::ManageOrders,
];

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Staff => "staff",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    /// Operations this role may perform.
    pub fn permissions(self) -> &'static [Operation] {
        match self {
            Role::Guest => GUEST_OPERATIONS,
            Role::Staff => STAFF_OPERATIONS,
            Role::Manager | Role::Admin => MANAGER_OPERATIONS,
        }
    }

    pub fn permits(self, operation: Operation) -> bool {
        self.permissions().contains(&operation)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::SearchRooms => "search_rooms",
            Operation::ViewRoom => "view_room",
            Operation::CreateBooking => "create_booking",
            Operation::CancelBooking => "cancel_booking",
            Operation::ConfirmBooking => "confirm_booking",
            Operation::CheckIn => "check_in",
            Operation::CheckOut => "check_out",
            Operation::ManageRooms => "manage_rooms",
            Operation::PlaceOrder => "place_order",
            Operation::ManageOrders => "manage_orders",
        }
    }

    /// Operation that authorizes moving a booking into `status`.
    ///
    /// `None` for `PendingPayment`, which is never a transition target.
    pub fn for_booking_status(status: BookingStatus) -> Option<Operation> {
        match status {
            BookingStatus::PendingPayment => None,
            BookingStatus::Confirmed => Some(Operation::ConfirmBooking),
            BookingStatus::CheckedIn => Some(Operation::CheckIn),
            BookingStatus::CheckedOut => Some(Operation::CheckOut),
            BookingStatus::Cancelled => Some(Operation::CancelBooking),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A caller already authenticated by the identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub guest_id: GuestId,
    pub role: Role,
}

/// # Errors
///
/// [`ReservationError::Forbidden`] if the role lacks `operation`.
pub fn authorize(identity: &Identity, operation: Operation) -> Result<(), ReservationError> {
    if identity.role.permits(operation) {
        Ok(())
    } else {
        Err(ReservationError::Forbidden {
            role: identity.role.as_str(),
            operation: operation.as_str(),
        })
    }
}
