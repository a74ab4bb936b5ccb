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

//! Rooms and room categories.

use crate::base::{CategoryId, RoomId};
use crate::lifecycle::ParseStatusError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical status of a room, maintained by housekeeping and front desk.
///
/// Independent of booking dates: a room being cleaned today can still be
/// booked for next week. Only `Available` rooms are offered by search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    Cleaning,
    OutOfService,
}

impl RoomStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Cleaning => "cleaning",
            RoomStatus::OutOfService => "out_of_service",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available" => Ok(RoomStatus::Available),
            "occupied" => Ok(RoomStatus::Occupied),
            "cleaning" => Ok(RoomStatus::Cleaning),
            "out_of_service" => Ok(RoomStatus::OutOfService),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A physical room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub number: String,
    pub category_id: CategoryId,
    pub status: RoomStatus,
    pub floor: i16,
}

/// A class of rooms sharing a nightly rate and occupancy limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCategory {
    pub id: CategoryId,
    pub name: String,
    /// Nightly rate in major units, at most two decimal places.
    pub base_rate: Decimal,
    pub max_occupancy: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl RoomCategory {
    pub fn fits(&self, guest_count: u32) -> bool {
        self.max_occupancy >= guest_count
    }
}

/// A room joined to its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomWithCategory {
    pub room: Room,
    pub category: RoomCategory,
}

/// A search hit: a free room with the price of the queried stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableRoom {
    pub room: Room,
    pub category: RoomCategory,
    pub total_price: Decimal,
    pub nights: u32,
}
