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

//! Reservation engine.
//!
//! The [`Engine`] is the entry point the API layer talks to. Reads go to the
//! availability engine; every write that can change a room's active booking
//! set goes through the [`ConflictGuard`].
//!
//! # Operations
//!
//! - **Search**: free rooms for a stay, priced and sorted. Advisory only.
//! - **Create booking**: validate, price, then check-and-insert under the
//!   locks of every requested room.
//! - **Update booking status**: transition-table check under the same locks,
//!   so a cancellation can never race a concurrent creation's overlap check.
//! - **Food orders**: price-snapshotted orders with their own lifecycle.
//!
//! Every committed change is announced to the audit consumer without
//! waiting for it.
//!
//! # Thread Safety
//!
//! `Engine` is `Send + Sync`; share it behind an [`Arc`] and call it from any
//! number of threads.

use crate::audit::{self, AuditEvent, AuditSink};
use crate::availability::{self, SearchQuery};
use crate::base::{BookingId, CategoryId, GuestId, MenuItemId, OrderId, RoomId};
use crate::booking::Booking;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{Entity, ReservationError};
use crate::guard::{ConflictGuard, normalize_rooms};
use crate::lifecycle::{BookingStatus, Lifecycle};
use crate::order::{FoodOrder, MenuItem, OrderDesk, OrderStatus};
use crate::pricing::{quote_stay, to_minor_units};
use crate::room::{AvailableRoom, Room, RoomCategory, RoomStatus, RoomWithCategory};
use crate::stay::Stay;
use crate::store::{MemoryStore, NewBooking, ReservationStore};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Room availability and booking engine.
///
/// # Invariants
///
/// - For any room, no two active bookings linked to it have overlapping
///   `[check_in, check_out)` intervals.
/// - Bookings are never removed; they only change status along the table in
///   [`BookingStatus`].
/// - No operation waits unboundedly for a lock.
pub struct Engine {
    store: Arc<dyn ReservationStore>,
    guard: ConflictGuard,
    orders: OrderDesk,
    audit: AuditSink,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl Engine {
    /// In-memory engine with default configuration, the system clock, and a
    /// logging audit consumer.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // === Inventory ===

    /// Adds or replaces a room category.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidRate`](crate::ValidationError::InvalidRate)
    /// if the base rate is negative or finer than cents.
    pub fn add_category(&self, category: RoomCategory) -> Result<(), ReservationError> {
        to_minor_units(category.base_rate)?;
        self.store.put_category(category)
    }

    /// Adds or replaces a room. Its category must already exist.
    pub fn add_room(&self, room: Room) -> Result<(), ReservationError> {
        if self.store.category(room.category_id)?.is_none() {
            return Err(ReservationError::NotFound(Entity::Category(room.category_id)));
        }
        self.store.put_room(room)
    }

    /// Records housekeeping / front-desk status. Does not touch bookings.
    pub fn set_room_status(
        &self,
        room_id: RoomId,
        status: RoomStatus,
    ) -> Result<Room, ReservationError> {
        let room = self.store.set_room_status(room_id, status)?;
        info!(%room_id, %status, "room status updated");
        Ok(room)
    }

    // === Availability ===

    /// Rooms free for `[check_in, check_out)` that fit `guest_count`,
    /// optionally restricted to one category.
    ///
    /// The result is a point-in-time estimate; booking one of these rooms can
    /// still fail with [`ReservationError::RoomUnavailable`].
    ///
    /// # Errors
    ///
    /// - `PastDate`, `InvalidRange`, `InvalidGuestCount` validation errors.
    /// - [`ReservationError::Persistence`] from the store.
    pub fn search_available_rooms(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guest_count: u32,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<AvailableRoom>, ReservationError> {
        let query = SearchQuery::new(
            check_in,
            check_out,
            guest_count,
            category_id,
            self.clock.today(),
            self.config.max_guest_count,
        )?;
        let rooms = availability::search(self.store.as_ref(), &query)?;
        debug!(%check_in, %check_out, guest_count, found = rooms.len(), "availability search");
        Ok(rooms)
    }

    /// # Errors
    ///
    /// [`ReservationError::NotFound`] if the room does not exist.
    pub fn get_room_details(&self, room_id: RoomId) -> Result<RoomWithCategory, ReservationError> {
        availability::room_details(self.store.as_ref(), room_id)
    }

    // === Bookings ===

    /// Reserves `room_ids` for the stay in `pending_payment`.
    ///
    /// # Errors
    ///
    /// - Validation errors for past, empty or inverted stays, and empty or
    ///   duplicated room lists.
    /// - [`ReservationError::NotFound`] for unknown rooms.
    /// - [`ReservationError::RoomUnavailable`] if any room is taken.
    /// - [`ReservationError::TransientConflict`] after bounded retries.
    /// - [`ReservationError::Persistence`], never retried.
    pub fn create_booking(
        &self,
        guest_id: GuestId,
        room_ids: &[RoomId],
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Booking, ReservationError> {
        self.create_booking_with_status(
            guest_id,
            room_ids,
            check_in,
            check_out,
            BookingStatus::PendingPayment,
        )
    }

    /// Like [`create_booking`](Self::create_booking) but lets trusted callers
    /// start in `confirmed` when payment was captured up front.
    pub fn create_booking_with_status(
        &self,
        guest_id: GuestId,
        room_ids: &[RoomId],
        check_in: NaiveDate,
        check_out: NaiveDate,
        status: BookingStatus,
    ) -> Result<Booking, ReservationError> {
        let result = self.try_create_booking(guest_id, room_ids, check_in, check_out, status);
        match &result {
            Ok(booking) => {
                info!(
                    booking_id = %booking.id,
                    %guest_id,
                    rooms = ?booking.room_ids,
                    status = %booking.status,
                    total = %booking.total_price,
                    "booking created"
                );
                self.audit.notify(AuditEvent::BookingCreated {
                    booking_id: booking.id,
                    guest_id,
                    room_ids: booking.room_ids.clone(),
                    status: booking.status,
                    total_price: booking.total_price,
                });
            }
            Err(err) => log_failure("create booking", err),
        }
        result
    }

    fn try_create_booking(
        &self,
        guest_id: GuestId,
        room_ids: &[RoomId],
        check_in: NaiveDate,
        check_out: NaiveDate,
        status: BookingStatus,
    ) -> Result<Booking, ReservationError> {
        if !status.is_initial() {
            return Err(ReservationError::InvalidTransition {
                entity: BookingStatus::ENTITY,
                from: "new",
                to: status.as_str(),
            });
        }
        let stay = Stay::starting_from(check_in, check_out, self.clock.today())?;
        let room_ids = normalize_rooms(room_ids)?;

        let mut rates = Vec::with_capacity(room_ids.len());
        for &room_id in &room_ids {
            let details = availability::room_details(self.store.as_ref(), room_id)?;
            rates.push(details.category.base_rate);
        }
        let quote = quote_stay(rates, &stay)?;

        self.guard.create_booking(
            self.store.as_ref(),
            NewBooking {
                guest_id,
                stay,
                status,
                total_price: quote.total,
                room_ids,
            },
        )
    }

    /// Moves a booking along its lifecycle.
    ///
    /// Cancelling or checking out releases the rooms for the booking's dates
    /// immediately.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::NotFound`] for unknown bookings.
    /// - [`ReservationError::InvalidTransition`]; the booking is unchanged.
    /// - [`ReservationError::TransientConflict`] after bounded retries.
    pub fn update_booking_status(
        &self,
        booking_id: BookingId,
        status: BookingStatus,
    ) -> Result<Booking, ReservationError> {
        match self.guard.update_status(self.store.as_ref(), booking_id, status) {
            Ok((from, booking)) => {
                info!(%booking_id, %from, to = %booking.status, "booking status changed");
                self.audit.notify(AuditEvent::BookingStatusChanged {
                    booking_id,
                    from,
                    to: booking.status,
                });
                Ok(booking)
            }
            Err(err) => {
                log_failure("update booking status", &err);
                Err(err)
            }
        }
    }

    /// # Errors
    ///
    /// [`ReservationError::NotFound`] if the booking does not exist.
    pub fn get_booking(&self, booking_id: BookingId) -> Result<Booking, ReservationError> {
        self.store
            .booking(booking_id)?
            .ok_or(ReservationError::NotFound(Entity::Booking(booking_id)))
    }

    /// All bookings in creation order, whatever their status.
    pub fn bookings(&self) -> Result<Vec<Booking>, ReservationError> {
        self.store.bookings()
    }

    pub fn bookings_for_guest(&self, guest_id: GuestId) -> Result<Vec<Booking>, ReservationError> {
        let mut bookings = self.store.bookings()?;
        bookings.retain(|b| b.guest_id == guest_id);
        Ok(bookings)
    }

    // === Food orders ===

    pub fn add_menu_item(&self, item: MenuItem) -> Result<(), ReservationError> {
        self.orders.upsert_menu_item(item)
    }

    /// Places a food order priced from the current menu.
    pub fn place_order(
        &self,
        guest_id: GuestId,
        lines: &[(MenuItemId, u32)],
    ) -> Result<FoodOrder, ReservationError> {
        let order = self.orders.place_order(guest_id, lines)?;
        info!(order_id = %order.id, %guest_id, total = %order.total, "order placed");
        self.audit.notify(AuditEvent::OrderPlaced {
            order_id: order.id,
            guest_id,
            total: order.total,
        });
        Ok(order)
    }

    pub fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<FoodOrder, ReservationError> {
        let (from, order) = self.orders.update_status(order_id, status)?;
        info!(%order_id, %from, to = %order.status, "order status changed");
        self.audit.notify(AuditEvent::OrderStatusChanged {
            order_id,
            from,
            to: order.status,
        });
        Ok(order)
    }

    /// # Errors
    ///
    /// [`ReservationError::NotFound`] if the order does not exist.
    pub fn get_order(&self, order_id: OrderId) -> Result<FoodOrder, ReservationError> {
        self.orders
            .order(order_id)
            .ok_or(ReservationError::NotFound(Entity::Order(order_id)))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn log_failure(operation: &str, err: &ReservationError) {
    match err {
        ReservationError::Persistence(_) => error!(operation, error = %err, "storage failure"),
        ReservationError::RoomUnavailable { .. } | ReservationError::TransientConflict { .. } => {
            warn!(operation, error = %err, "booking conflict")
        }
        _ => debug!(operation, error = %err, "request rejected"),
    }
}

/// Assembles an [`Engine`] from optional parts.
#[derive(Default)]
pub struct EngineBuilder {
    store: Option<Arc<dyn ReservationStore>>,
    clock: Option<Arc<dyn Clock>>,
    config: EngineConfig,
    audit: Option<AuditSink>,
}

impl EngineBuilder {
    pub fn store(mut self, store: Arc<dyn ReservationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the default logging consumer with a caller-owned sink.
    pub fn audit(mut self, sink: AuditSink) -> Self {
        self.audit = Some(sink);
        self
    }

    pub fn build(self) -> Engine {
        let audit = self
            .audit
            .unwrap_or_else(|| logging_audit(self.config.audit_capacity));
        Engine {
            store: self.store.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            guard: ConflictGuard::new(&self.config),
            orders: OrderDesk::new(),
            audit,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            config: self.config,
        }
    }
}

fn logging_audit(capacity: usize) -> AuditSink {
    let (sink, receiver) = AuditSink::bounded(capacity);
    match audit::spawn_consumer(receiver, audit::log_event) {
        Ok(_) => sink,
        Err(err) => {
            warn!(error = %err, "could not start audit consumer, audit disabled");
            AuditSink::disabled()
        }
    }
}
