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

//! Booking conflict guard.
//!
//! Serializes every write that can change a room's active booking set. Each
//! room has its own exclusive lock; a writer takes the locks of all rooms it
//! touches, re-checks overlaps against the store, writes, and releases.
//!
//! # Lock discipline
//!
//! - Locks are acquired in ascending [`RoomId`] order, so two writers sharing
//!   rooms can never wait on each other in a cycle.
//! - Each acquisition waits at most `lock_timeout`. A timeout releases every
//!   lock already held and fails with [`ReservationError::TransientConflict`].
//! - Transient conflicts are retried up to `max_conflict_retries` times with
//!   linear back-off. Nothing else is retried; in particular a failed insert
//!   is never replayed.
//! - Availability reads never take these locks.

use crate::base::{BookingId, RoomId};
use crate::booking::Booking;
use crate::config::EngineConfig;
use crate::error::{Entity, ReservationError, ValidationError};
use crate::lifecycle::{BookingStatus, transition};
use crate::store::{NewBooking, ReservationStore};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-room exclusive locks plus the bounded retry policy around them.
#[derive(Debug)]
pub struct ConflictGuard {
    room_locks: DashMap<RoomId, Arc<Mutex<()>>>,
    lock_timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
}

impl ConflictGuard {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            room_locks: DashMap::new(),
            lock_timeout: config.lock_timeout,
            max_retries: config.max_conflict_retries,
            retry_backoff: config.retry_backoff,
        }
    }

    /// Runs `op` once while holding the locks of every room in `room_ids`.
    ///
    /// `room_ids` must be sorted ascending and free of duplicates.
    ///
    /// # Errors
    ///
    /// [`ReservationError::TransientConflict`] naming the first room whose
    /// lock was not acquired in time, or whatever `op` returns.
    pub fn with_rooms<T>(
        &self,
        room_ids: &[RoomId],
        op: impl FnOnce() -> Result<T, ReservationError>,
    ) -> Result<T, ReservationError> {
        debug_assert!(
            room_ids.windows(2).all(|w| w[0] < w[1]),
            "room ids must be sorted and unique: {room_ids:?}"
        );

        let handles: Vec<(RoomId, Arc<Mutex<()>>)> = room_ids
            .iter()
            .map(|&room_id| {
                let handle = self.room_locks.entry(room_id).or_default().clone();
                (room_id, handle)
            })
            .collect();

        let mut guards = Vec::with_capacity(handles.len());
        for (room_id, handle) in &handles {
            match handle.try_lock_for(self.lock_timeout) {
                Some(guard) => guards.push(guard),
                None => {
                    return Err(ReservationError::TransientConflict { room_id: *room_id });
                }
            }
        }

        op()
    }

    /// [`with_rooms`](Self::with_rooms), retrying transient conflicts.
    pub fn with_rooms_retrying<T>(
        &self,
        room_ids: &[RoomId],
        mut op: impl FnMut() -> Result<T, ReservationError>,
    ) -> Result<T, ReservationError> {
        let mut attempt = 0;
        loop {
            match self.with_rooms(room_ids, &mut op) {
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(attempt, rooms = ?room_ids, error = %err, "room lock contention, retrying");
                    thread::sleep(self.retry_backoff * attempt);
                }
                result => return result,
            }
        }
    }

    /// Checks for overlaps and inserts the booking as one unit.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyRoomList`] / [`ValidationError::DuplicateRoom`].
    /// - [`ReservationError::RoomUnavailable`] if any room is held by an
    ///   overlapping active booking at commit time.
    /// - [`ReservationError::TransientConflict`] once retries are exhausted.
    /// - [`ReservationError::Persistence`] from the store, unretried.
    pub fn create_booking(
        &self,
        store: &dyn ReservationStore,
        booking: NewBooking,
    ) -> Result<Booking, ReservationError> {
        let room_ids = normalize_rooms(&booking.room_ids)?;
        let booking = NewBooking { room_ids, ..booking };

        self.with_rooms_retrying(&booking.room_ids, || {
            let blocked = store.blocked_rooms(&booking.stay, Some(&booking.room_ids))?;
            if let Some(&room_id) = booking.room_ids.iter().find(|id| blocked.contains(id)) {
                debug!(room_id = %room_id, "overlap found at commit");
                return Err(ReservationError::RoomUnavailable { room_id });
            }
            store.insert_booking(booking.clone())
        })
    }

    /// Applies a status change under the booking's room locks.
    ///
    /// Returns the previous status with the updated booking.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::NotFound`] for unknown bookings.
    /// - [`ReservationError::InvalidTransition`] if the move is illegal; the
    ///   booking is left unchanged.
    pub fn update_status(
        &self,
        store: &dyn ReservationStore,
        booking_id: BookingId,
        status: BookingStatus,
    ) -> Result<(BookingStatus, Booking), ReservationError> {
        let not_found = || ReservationError::NotFound(Entity::Booking(booking_id));
        // Room links never change, so the pre-lock read is enough to pick locks.
        let room_ids = store.booking(booking_id)?.ok_or_else(not_found)?.room_ids;

        self.with_rooms_retrying(&room_ids, || {
            let current = store.booking(booking_id)?.ok_or_else(not_found)?;
            let next = transition(current.status, status)?;
            let updated = store.set_booking_status(booking_id, next)?;
            Ok((current.status, updated))
        })
    }
}

/// Sorts room ids, rejecting empty lists and duplicates.
pub(crate) fn normalize_rooms(room_ids: &[RoomId]) -> Result<Vec<RoomId>, ValidationError> {
    if room_ids.is_empty() {
        return Err(ValidationError::EmptyRoomList);
    }
    let mut sorted = room_ids.to_vec();
    sorted.sort_unstable();
    if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
        return Err(ValidationError::DuplicateRoom(pair[0]));
    }
    Ok(sorted)
}
