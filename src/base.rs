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

//! Core identifier types for rooms, bookings, guests and orders.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

identifier!(
    /// Unique identifier for a physical room.
    ///
    /// Ordering matters: the conflict guard acquires room locks in ascending
    /// `RoomId` order.
    RoomId(u32)
);

identifier!(
    /// Unique identifier for a room category (e.g. "Deluxe Double").
    CategoryId(u32)
);

identifier!(
    /// Unique identifier for a booking.
    ///
    /// Allocated by the store, monotonically increasing, never reused.
    BookingId(u64)
);

identifier!(
    /// Reference to a guest supplied by the identity layer.
    GuestId(u32)
);

identifier!(
    /// Unique identifier for a food order.
    OrderId(u64)
);

identifier!(
    /// Unique identifier for a menu item.
    MenuItemId(u32)
);
