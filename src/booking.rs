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

//! Bookings and their room links.

use crate::base::{BookingId, GuestId, RoomId};
use crate::lifecycle::BookingStatus;
use crate::stay::Stay;
use rust_decimal::Decimal;
use serde::Serialize;

/// A reservation of one or more rooms for a stay.
///
/// Bookings are never deleted; cancellation is a status change so the row
/// stays available for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub id: BookingId,
    pub guest_id: GuestId,
    pub stay: Stay,
    pub status: BookingStatus,
    pub total_price: Decimal,
    /// Rooms linked to this booking, ascending.
    pub room_ids: Vec<RoomId>,
}

impl Booking {
    /// True if this booking holds `room_id` over any night of `stay`.
    pub fn blocks(&self, room_id: RoomId, stay: &Stay) -> bool {
        self.status.is_active() && self.room_ids.contains(&room_id) && self.stay.overlaps(stay)
    }

    pub fn links(&self) -> impl Iterator<Item = BookingRoomLink> + '_ {
        self.room_ids.iter().map(|&room_id| BookingRoomLink {
            booking_id: self.id,
            room_id,
        })
    }
}

/// Join row between a booking and one of its rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BookingRoomLink {
    pub booking_id: BookingId,
    pub room_id: RoomId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn stay(from: u32, to: u32) -> Stay {
        Stay::new(
            NaiveDate::from_ymd_opt(2024, 5, from).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, to).unwrap(),
        )
        .unwrap()
    }

    fn booking(status: BookingStatus) -> Booking {
        Booking {
            id: BookingId(1),
            guest_id: GuestId(1),
            stay: stay(10, 12),
            status,
            total_price: dec!(200),
            room_ids: vec![RoomId(1), RoomId(2)],
        }
    }

    #[test]
    fn active_booking_blocks_overlapping_stay() {
        let b = booking(BookingStatus::Confirmed);
        assert!(b.blocks(RoomId(1), &stay(11, 13)));
        assert!(b.blocks(RoomId(2), &stay(9, 11)));
    }

    #[test]
    fn does_not_block_other_rooms_or_adjacent_stays() {
        let b = booking(BookingStatus::CheckedIn);
        assert!(!b.blocks(RoomId(3), &stay(10, 12)));
        assert!(!b.blocks(RoomId(1), &stay(12, 14)));
        assert!(!b.blocks(RoomId(1), &stay(8, 10)));
    }

    #[test]
    fn inactive_booking_never_blocks() {
        for status in [BookingStatus::Cancelled, BookingStatus::CheckedOut] {
            assert!(!booking(status).blocks(RoomId(1), &stay(10, 12)));
        }
    }

    #[test]
    fn one_link_per_room() {
        let links: Vec<_> = booking(BookingStatus::Confirmed).links().collect();
        assert_eq!(
            links,
            vec![
                BookingRoomLink {
                    booking_id: BookingId(1),
                    room_id: RoomId(1),
                },
                BookingRoomLink {
                    booking_id: BookingId(1),
                    room_id: RoomId(2),
                },
            ]
        );
    }
}
