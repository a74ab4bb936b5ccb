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

//! Reservation store.
//!
//! [`ReservationStore`] is the boundary to the relational store holding rooms,
//! categories, bookings and booking-room links. The core only needs joined
//! reads, one atomic multi-row insert per booking, and single-row status
//! writes; serialization per room is the conflict guard's job, not the
//! store's.
//!
//! [`MemoryStore`] keeps each table in a [`DashMap`] plus a room → bookings
//! link index for overlap checks.

use crate::base::{BookingId, CategoryId, GuestId, RoomId};
use crate::booking::Booking;
use crate::error::{Entity, ReservationError};
use crate::lifecycle::BookingStatus;
use crate::room::{Room, RoomCategory, RoomStatus};
use crate::stay::Stay;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

/// Row values for a booking about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub guest_id: GuestId,
    pub stay: Stay,
    pub status: BookingStatus,
    pub total_price: Decimal,
    /// Sorted, deduplicated.
    pub room_ids: Vec<RoomId>,
}

/// Storage operations consumed by the availability engine and conflict guard.
///
/// Every method may fail with [`ReservationError::Persistence`].
pub trait ReservationStore: Send + Sync {
    fn category(&self, id: CategoryId) -> Result<Option<RoomCategory>, ReservationError>;

    fn categories(&self) -> Result<Vec<RoomCategory>, ReservationError>;

    fn put_category(&self, category: RoomCategory) -> Result<(), ReservationError>;

    fn room(&self, id: RoomId) -> Result<Option<Room>, ReservationError>;

    fn rooms(&self) -> Result<Vec<Room>, ReservationError>;

    fn put_room(&self, room: Room) -> Result<(), ReservationError>;

    /// Updates a room's physical status.
    fn set_room_status(&self, id: RoomId, status: RoomStatus) -> Result<Room, ReservationError>;

    /// Rooms held by an active booking overlapping `stay`.
    ///
    /// With `Some(room_ids)` only those rooms are checked; with `None` every
    /// room is.
    fn blocked_rooms(
        &self,
        stay: &Stay,
        room_ids: Option<&[RoomId]>,
    ) -> Result<HashSet<RoomId>, ReservationError>;

    /// Inserts the booking row and one link per room as a single unit,
    /// allocating a fresh id.
    fn insert_booking(&self, booking: NewBooking) -> Result<Booking, ReservationError>;

    fn booking(&self, id: BookingId) -> Result<Option<Booking>, ReservationError>;

    /// All bookings in creation order.
    fn bookings(&self) -> Result<Vec<Booking>, ReservationError>;

    /// Overwrites a booking's status. Transition rules are checked by callers.
    fn set_booking_status(
        &self,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<Booking, ReservationError>;
}

/// In-process [`ReservationStore`].
#[derive(Debug)]
pub struct MemoryStore {
    categories: DashMap<CategoryId, RoomCategory>,
    rooms: DashMap<RoomId, Room>,
    bookings: DashMap<BookingId, Booking>,
    /// Booking-room links indexed by room.
    links: DashMap<RoomId, Vec<BookingId>>,
    next_booking_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            categories: DashMap::new(),
            rooms: DashMap::new(),
            bookings: DashMap::new(),
            links: DashMap::new(),
            next_booking_id: AtomicU64::new(1),
        }
    }

    fn blocked_by_links(&self, stay: &Stay, room_ids: &[RoomId]) -> HashSet<RoomId> {
        let mut blocked = HashSet::new();
        for &room_id in room_ids {
            // Clone the link list so no links guard is held while reading bookings.
            let linked = match self.links.get(&room_id) {
                Some(ids) => ids.value().clone(),
                None => continue,
            };
            let taken = linked.iter().any(|booking_id| {
                self.bookings
                    .get(booking_id)
                    .is_some_and(|b| b.blocks(room_id, stay))
            });
            if taken {
                blocked.insert(room_id);
            }
        }
        blocked
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservationStore for MemoryStore {
    fn category(&self, id: CategoryId) -> Result<Option<RoomCategory>, ReservationError> {
        Ok(self.categories.get(&id).map(|c| c.value().clone()))
    }

    fn categories(&self) -> Result<Vec<RoomCategory>, ReservationError> {
        Ok(self.categories.iter().map(|c| c.value().clone()).collect())
    }

    fn put_category(&self, category: RoomCategory) -> Result<(), ReservationError> {
        self.categories.insert(category.id, category);
        Ok(())
    }

    fn room(&self, id: RoomId) -> Result<Option<Room>, ReservationError> {
        Ok(self.rooms.get(&id).map(|r| r.value().clone()))
    }

    fn rooms(&self) -> Result<Vec<Room>, ReservationError> {
        Ok(self.rooms.iter().map(|r| r.value().clone()).collect())
    }

    fn put_room(&self, room: Room) -> Result<(), ReservationError> {
        self.rooms.insert(room.id, room);
        Ok(())
    }

    fn set_room_status(&self, id: RoomId, status: RoomStatus) -> Result<Room, ReservationError> {
        let mut room = self
            .rooms
            .get_mut(&id)
            .ok_or(ReservationError::NotFound(Entity::Room(id)))?;
        room.status = status;
        Ok(room.value().clone())
    }

    fn blocked_rooms(
        &self,
        stay: &Stay,
        room_ids: Option<&[RoomId]>,
    ) -> Result<HashSet<RoomId>, ReservationError> {
        if let Some(room_ids) = room_ids {
            return Ok(self.blocked_by_links(stay, room_ids));
        }
        let mut blocked = HashSet::new();
        for booking in self.bookings.iter() {
            if booking.status.is_active() && booking.stay.overlaps(stay) {
                blocked.extend(booking.room_ids.iter().copied());
            }
        }
        Ok(blocked)
    }

    fn insert_booking(&self, new: NewBooking) -> Result<Booking, ReservationError> {
        let id = BookingId(self.next_booking_id.fetch_add(1, Ordering::Relaxed));
        let booking = Booking {
            id,
            guest_id: new.guest_id,
            stay: new.stay,
            status: new.status,
            total_price: new.total_price,
            room_ids: new.room_ids,
        };

        // Row first, then links: a reader that sees a link always finds its row.
        self.bookings.insert(id, booking.clone());
        for link in booking.links() {
            self.links.entry(link.room_id).or_default().push(link.booking_id);
        }
        Ok(booking)
    }

    fn booking(&self, id: BookingId) -> Result<Option<Booking>, ReservationError> {
        Ok(self.bookings.get(&id).map(|b| b.value().clone()))
    }

    fn bookings(&self) -> Result<Vec<Booking>, ReservationError> {
        let mut all: Vec<Booking> = self.bookings.iter().map(|b| b.value().clone()).collect();
        // Ids are allocated in creation order.
        all.sort_by_key(|b| b.id);
        Ok(all)
    }

    fn set_booking_status(
        &self,
        id: BookingId,
        status: BookingStatus,
    ) -> Result<Booking, ReservationError> {
        let mut booking = self
            .bookings
            .get_mut(&id)
            .ok_or(ReservationError::NotFound(Entity::Booking(id)))?;
        booking.status = status;
        Ok(booking.value().clone())
    }
}
