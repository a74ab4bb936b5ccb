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

//! # Hotel Reservation
//!
//! This library provides the room availability and booking core of a hotel:
//! finding free rooms for a stay, reserving them so that no room is ever
//! double-booked, and driving bookings and food orders through their
//! lifecycles.
//!
//! ## Core Components
//!
//! - [`Engine`]: Entry point wiring search, booking, status changes and orders
//! - [`ConflictGuard`]: Per-room locking that makes check-and-insert atomic
//! - [`calculate_total_price`]: Fixed-point stay pricing
//! - [`BookingStatus`] / [`OrderStatus`]: Transition-table lifecycles
//! - [`ReservationStore`]: Storage boundary, with the in-memory [`MemoryStore`]
//! - [`ReservationError`]: Error taxonomy for every operation
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use hotel_reservation_rs::{
//!     AuditSink, BookingStatus, CategoryId, Engine, FixedClock, GuestId, Room, RoomCategory,
//!     RoomId, RoomStatus,
//! };
//! use rust_decimal_macros::dec;
//! use std::sync::Arc;
//!
//! let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
//! let engine = Engine::builder()
//!     .clock(Arc::new(FixedClock::new(today)))
//!     .audit(AuditSink::disabled())
//!     .build();
//!
//! engine
//!     .add_category(RoomCategory {
//!         id: CategoryId(1),
//!         name: "Double".to_string(),
//!         base_rate: dec!(120.00),
//!         max_occupancy: 2,
//!         amenities: vec!["wifi".to_string()],
//!     })
//!     .unwrap();
//! engine
//!     .add_room(Room {
//!         id: RoomId(1),
//!         number: "101".to_string(),
//!         category_id: CategoryId(1),
//!         status: RoomStatus::Available,
//!         floor: 1,
//!     })
//!     .unwrap();
//!
//! let check_in = NaiveDate::from_ymd_opt(2030, 1, 10).unwrap();
//! let check_out = NaiveDate::from_ymd_opt(2030, 1, 12).unwrap();
//!
//! // Search, then book
//! let free = engine.search_available_rooms(check_in, check_out, 2, None).unwrap();
//! assert_eq!(free[0].total_price, dec!(240.00));
//!
//! let booking = engine
//!     .create_booking(GuestId(7), &[RoomId(1)], check_in, check_out)
//!     .unwrap();
//! assert_eq!(booking.status, BookingStatus::PendingPayment);
//!
//! // The room is gone for overlapping dates
//! assert!(engine.search_available_rooms(check_in, check_out, 2, None).unwrap().is_empty());
//! ```
//!
//! ## Thread Safety
//!
//! Searches read a snapshot and never block writers. Booking creation and
//! status changes serialize per room with bounded lock waits, so concurrent
//! requests for different rooms proceed in parallel.

pub mod access;
pub mod audit;
pub mod availability;
mod base;
pub mod booking;
pub mod clock;
pub mod config;
mod engine;
pub mod error;
pub mod guard;
pub mod lifecycle;
pub mod order;
pub mod pricing;
pub mod room;
mod stay;
pub mod store;

pub use access::{Identity, Operation, Role, authorize};
pub use audit::{AuditEvent, AuditSink};
pub use availability::SearchQuery;
pub use base::{BookingId, CategoryId, GuestId, MenuItemId, OrderId, RoomId};
pub use booking::{Booking, BookingRoomLink};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder};
pub use error::{Entity, ReservationError, ValidationError};
pub use guard::ConflictGuard;
pub use lifecycle::{BookingStatus, Lifecycle, ParseStatusError, transition};
pub use order::{FoodOrder, FoodOrderItem, MenuItem, OrderDesk, OrderStatus};
pub use pricing::{PriceQuote, calculate_total_price, quote};
pub use room::{AvailableRoom, Room, RoomCategory, RoomStatus, RoomWithCategory};
pub use stay::Stay;
pub use store::{MemoryStore, NewBooking, ReservationStore};
