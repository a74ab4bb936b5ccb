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

//! Best-effort audit notifications.
//!
//! Committed booking and order changes are handed to an independent consumer
//! over a bounded channel. Sending never blocks: when the buffer is full or
//! the consumer is gone the event is dropped with a warning and the
//! operation that produced it still succeeds.

use crate::base::{BookingId, GuestId, OrderId, RoomId};
use crate::lifecycle::BookingStatus;
use crate::order::OrderStatus;
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// A committed change worth recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    BookingCreated {
        booking_id: BookingId,
        guest_id: GuestId,
        room_ids: Vec<RoomId>,
        status: BookingStatus,
        total_price: Decimal,
    },
    BookingStatusChanged {
        booking_id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    },
    OrderPlaced {
        order_id: OrderId,
        guest_id: GuestId,
        total: Decimal,
    },
    OrderStatusChanged {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    },
}

/// Sending half of the audit channel.
#[derive(Debug, Clone)]
pub struct AuditSink {
    sender: Option<Sender<AuditEvent>>,
}

impl AuditSink {
    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Bounded sink and the receiver its consumer should drain.
    pub fn bounded(capacity: usize) -> (Self, Receiver<AuditEvent>) {
        let (sender, receiver) = channel::bounded(capacity);
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// Hands `event` to the consumer without waiting.
    pub fn notify(&self, event: AuditEvent) {
        let Some(sender) = &self.sender else {
            return;
        };
        match sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(?event, "audit buffer full, dropping event");
            }
            Err(TrySendError::Disconnected(event)) => {
                warn!(?event, "audit consumer gone, dropping event");
            }
        }
    }
}

/// Drains `receiver` on a dedicated thread until every sink is dropped.
pub fn spawn_consumer<F>(receiver: Receiver<AuditEvent>, mut handle: F) -> io::Result<JoinHandle<()>>
where
    F: FnMut(AuditEvent) + Send + 'static,
{
    thread::Builder::new()
        .name("audit-consumer".to_string())
        .spawn(move || {
            for event in receiver {
                handle(event);
            }
        })
}

/// Default consumer: one structured log line per event.
pub fn log_event(event: AuditEvent) {
    match event {
        AuditEvent::BookingCreated {
            booking_id,
            guest_id,
            room_ids,
            status,
            total_price,
        } => info!(
            target: "audit",
            %booking_id, %guest_id, rooms = ?room_ids, %status, %total_price,
            "booking created"
        ),
        AuditEvent::BookingStatusChanged {
            booking_id,
            from,
            to,
        } => info!(target: "audit", %booking_id, %from, %to, "booking status changed"),
        AuditEvent::OrderPlaced {
            order_id,
            guest_id,
            total,
        } => info!(target: "audit", %order_id, %guest_id, %total, "order placed"),
        AuditEvent::OrderStatusChanged { order_id, from, to } => {
            info!(target: "audit", %order_id, %from, %to, "order status changed")
        }
    }
}
