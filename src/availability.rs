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

//! Availability engine.
//!
//! Answers "which rooms are free for this stay" from a point-in-time read of
//! the store. Results are advisory: nothing is reserved, and the conflict
//! guard re-checks at commit. Searches never take room locks and never block
//! writers.

use crate::base::{CategoryId, RoomId};
use crate::error::{Entity, ReservationError, ValidationError};
use crate::pricing::quote_stay;
use crate::room::{AvailableRoom, RoomStatus, RoomWithCategory};
use crate::stay::Stay;
use crate::store::ReservationStore;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A validated availability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchQuery {
    pub stay: Stay,
    pub guest_count: u32,
    pub category_id: Option<CategoryId>,
}

impl SearchQuery {
    /// Validates raw search input.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::PastDate`] if `check_in < today`.
    /// - [`ValidationError::InvalidRange`] if `check_out <= check_in`.
    /// - [`ValidationError::InvalidGuestCount`] unless `1 <= guest_count <= max_guests`.
    pub fn new(
        check_in: NaiveDate,
        check_out: NaiveDate,
        guest_count: u32,
        category_id: Option<CategoryId>,
        today: NaiveDate,
        max_guests: u32,
    ) -> Result<Self, ValidationError> {
        let stay = Stay::starting_from(check_in, check_out, today)?;
        if guest_count == 0 || guest_count > max_guests {
            return Err(ValidationError::InvalidGuestCount {
                count: guest_count,
                max: max_guests,
            });
        }
        Ok(Self {
            stay,
            guest_count,
            category_id,
        })
    }
}

/// Free rooms for the query, cheapest category first, then by room number.
///
/// A guest count no category can hold yields an empty list, not an error.
pub fn search(
    store: &dyn ReservationStore,
    query: &SearchQuery,
) -> Result<Vec<AvailableRoom>, ReservationError> {
    let blocked = store.blocked_rooms(&query.stay, None)?;
    let categories: HashMap<CategoryId, _> = store
        .categories()?
        .into_iter()
        .filter(|c| query.category_id.is_none_or(|wanted| wanted == c.id))
        .filter(|c| c.fits(query.guest_count))
        .map(|c| (c.id, c))
        .collect();

    let mut available = Vec::new();
    for room in store.rooms()? {
        if room.status != RoomStatus::Available || blocked.contains(&room.id) {
            continue;
        }
        let Some(category) = categories.get(&room.category_id) else {
            continue;
        };
        let quote = quote_stay([category.base_rate], &query.stay)?;
        available.push(AvailableRoom {
            room,
            category: category.clone(),
            total_price: quote.total,
            nights: quote.nights,
        });
    }

    available.sort_by(|a, b| {
        a.category
            .base_rate
            .cmp(&b.category.base_rate)
            .then_with(|| cmp_room_numbers(&a.room.number, &b.room.number))
            .then_with(|| a.room.id.cmp(&b.room.id))
    });
    Ok(available)
}

/// Orders room numbers by their leading digits as a number, then by the
/// rest of the text: `"9" < "10" < "100"`, `"12A" < "12B"`.
fn cmp_room_numbers(a: &str, b: &str) -> Ordering {
    fn split(number: &str) -> (Option<u64>, &str) {
        let end = number
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(number.len());
        (number[..end].parse().ok(), &number[end..])
    }
    let (a_num, a_rest) = split(a);
    let (b_num, b_rest) = split(b);
    a_num
        .cmp(&b_num)
        .then_with(|| a_rest.cmp(b_rest))
        .then_with(|| a.cmp(b))
}

/// Looks up a room joined to its category.
///
/// # Errors
///
/// [`ReservationError::NotFound`] if the room, or its category, is missing.
pub fn room_details(
    store: &dyn ReservationStore,
    room_id: RoomId,
) -> Result<RoomWithCategory, ReservationError> {
    let room = store
        .room(room_id)?
        .ok_or(ReservationError::NotFound(Entity::Room(room_id)))?;
    let category = store
        .category(room.category_id)?
        .ok_or(ReservationError::NotFound(Entity::Category(room.category_id)))?;
    Ok(RoomWithCategory { room, category })
}
