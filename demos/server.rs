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

//! REST API server for the reservation engine.
//!
//! Callers identify themselves with `x-guest-id` and `x-role` headers (as an
//! upstream auth proxy would set them); every handler authorizes the
//! operation before touching the engine.
//!
//! Run with: `cargo run --example server`
//!
//! # Example requests
//!
//! ```bash
//! # Search
//! curl 'http://localhost:3000/rooms/available?check_in=2030-01-10&check_out=2030-01-12&guests=2' \
//!   -H 'x-guest-id: 7' -H 'x-role: guest'
//!
//! # Book
//! curl -X POST http://localhost:3000/bookings \
//!   -H 'x-guest-id: 7' -H 'x-role: guest' -H 'Content-Type: application/json' \
//!   -d '{"room_ids": [3], "check_in": "2030-01-10", "check_out": "2030-01-12"}'
//!
//! # Confirm payment (staff)
//! curl -X PATCH http://localhost:3000/bookings/1/status \
//!   -H 'x-guest-id: 1' -H 'x-role: staff' -H 'Content-Type: application/json' \
//!   -d '{"status": "confirmed"}'
//! ```

use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Query, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::NaiveDate;
use hotel_reservation_rs::{
    AvailableRoom, Booking, BookingId, BookingStatus, CategoryId, Engine, EngineConfig,
    FoodOrder, GuestId, Identity, MenuItem, MenuItemId, Operation, OrderId, OrderStatus,
    ReservationError, Role, Room, RoomCategory, RoomId, RoomStatus, RoomWithCategory,
    authorize,
};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

// === Request/Response DTOs ===

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub category: Option<u32>,
}

/// ```json
/// {"room_ids": [3, 4], "check_in": "2030-01-10", "check_out": "2030-01-12"}
/// ```
#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub room_ids: Vec<u32>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct BookingStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Deserialize)]
pub struct OrderLine {
    pub menu_item_id: u32,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Deserialize)]
pub struct OrderStatusRequest {
    pub status: OrderStatus,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

// === Error Handling ===

pub enum AppError {
    Unauthenticated(&'static str),
    Reservation(ReservationError),
    /// A blocking engine task panicked or was cancelled.
    Task(String),
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        AppError::Reservation(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = match self {
            AppError::Unauthenticated(reason) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", reason.to_string())
            }
            AppError::Task(reason) => (StatusCode::INTERNAL_SERVER_ERROR, "TASK_FAILED", reason),
            AppError::Reservation(err) => {
                let (status, code) = match &err {
                    ReservationError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                    ReservationError::RoomUnavailable { .. } => {
                        (StatusCode::CONFLICT, "ROOM_UNAVAILABLE")
                    }
                    ReservationError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    ReservationError::InvalidTransition { .. } => {
                        (StatusCode::CONFLICT, "INVALID_TRANSITION")
                    }
                    ReservationError::TransientConflict { .. } => {
                        (StatusCode::SERVICE_UNAVAILABLE, "TRANSIENT_CONFLICT")
                    }
                    ReservationError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                    ReservationError::Persistence(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_ERROR")
                    }
                };
                (status, code, err.to_string())
            }
        };

        (
            status,
            Json(ErrorResponse {
                error,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Identity ===

/// Caller identity taken from `x-guest-id` / `x-role`.
pub struct Caller(Identity);

fn parse_role(value: &str) -> Option<Role> {
    match value.trim().to_lowercase().as_str() {
        "guest" => Some(Role::Guest),
        "staff" => Some(Role::Staff),
        "manager" => Some(Role::Manager),
        "admin" => Some(Role::Admin),
        _ => None,
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
        };
        let guest_id = header("x-guest-id")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .ok_or(AppError::Unauthenticated("missing or invalid x-guest-id"))?;
        let role = header("x-role")
            .and_then(parse_role)
            .ok_or(AppError::Unauthenticated("missing or invalid x-role"))?;
        Ok(Caller(Identity {
            guest_id: GuestId(guest_id),
            role,
        }))
    }
}

impl Caller {
    /// Guests may only act on their own records.
    fn owns(&self, guest_id: GuestId, operation: &'static str) -> Result<(), ReservationError> {
        if self.0.role == Role::Guest && self.0.guest_id != guest_id {
            return Err(ReservationError::Forbidden {
                role: self.0.role.as_str(),
                operation,
            });
        }
        Ok(())
    }
}

// === Handlers ===

/// Runs an engine write off the async workers: booking writes may wait on
/// room locks and sleep between retries.
async fn blocking<T, F>(op: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, ReservationError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| AppError::Task(format!("engine task failed: {e}")))?
        .map_err(AppError::from)
}

/// GET /rooms/available - Rooms free for a stay.
async fn search_rooms(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<AvailableRoom>>, AppError> {
    authorize(&identity, Operation::SearchRooms)?;
    let rooms = state.engine.search_available_rooms(
        params.check_in,
        params.check_out,
        params.guests,
        params.category.map(CategoryId),
    )?;
    Ok(Json(rooms))
}

/// GET /rooms/{id} - Room with its category.
async fn get_room(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(id): Path<u32>,
) -> Result<Json<RoomWithCategory>, AppError> {
    authorize(&identity, Operation::ViewRoom)?;
    Ok(Json(state.engine.get_room_details(RoomId(id))?))
}

/// POST /bookings - Reserve rooms for the calling guest.
async fn create_booking(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    authorize(&identity, Operation::CreateBooking)?;
    let room_ids: Vec<RoomId> = request.room_ids.into_iter().map(RoomId).collect();
    let engine = Arc::clone(&state.engine);
    let booking = blocking(move || {
        engine.create_booking(
            identity.guest_id,
            &room_ids,
            request.check_in,
            request.check_out,
        )
    })
    .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<u64>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.engine.get_booking(BookingId(id))?;
    caller.owns(booking.guest_id, "view_booking")?;
    Ok(Json(booking))
}

/// PATCH /bookings/{id}/status - Confirm, check in, check out or cancel.
async fn update_booking_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<u64>,
    Json(request): Json<BookingStatusRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking_id = BookingId(id);
    let booking = state.engine.get_booking(booking_id)?;
    // No operation moves a booking back to pending; the engine rejects it.
    if let Some(operation) = Operation::for_booking_status(request.status) {
        authorize(&caller.0, operation)?;
        caller.owns(booking.guest_id, operation.as_str())?;
    }
    let engine = Arc::clone(&state.engine);
    let status = request.status;
    let updated = blocking(move || engine.update_booking_status(booking_id, status)).await?;
    Ok(Json(updated))
}

/// POST /orders - Food order for the calling guest.
async fn place_order(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Json(request): Json<OrderRequest>,
) -> Result<(StatusCode, Json<FoodOrder>), AppError> {
    authorize(&identity, Operation::PlaceOrder)?;
    let lines: Vec<(MenuItemId, u32)> = request
        .items
        .iter()
        .map(|line| (MenuItemId(line.menu_item_id), line.quantity))
        .collect();
    let order = state.engine.place_order(identity.guest_id, &lines)?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PATCH /orders/{id}/status - Kitchen workflow.
async fn update_order_status(
    State(state): State<AppState>,
    Caller(identity): Caller,
    Path(id): Path<u64>,
    Json(request): Json<OrderStatusRequest>,
) -> Result<Json<FoodOrder>, AppError> {
    authorize(&identity, Operation::ManageOrders)?;
    Ok(Json(
        state.engine.update_order_status(OrderId(id), request.status)?,
    ))
}

// === Router ===

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/rooms/available", get(search_rooms))
        .route("/rooms/{id}", get(get_room))
        .route("/bookings", post(create_booking))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}/status", patch(update_booking_status))
        .route("/orders", post(place_order))
        .route("/orders/{id}/status", patch(update_order_status))
        .with_state(state)
}

// === Seed Data ===

pub fn seed(engine: &Engine) -> Result<(), ReservationError> {
    let categories = [
        (1, "Single", dec!(80.00), 1),
        (2, "Double", dec!(120.00), 2),
        (3, "Suite", dec!(310.00), 4),
    ];
    for (id, name, base_rate, max_occupancy) in categories {
        engine.add_category(RoomCategory {
            id: CategoryId(id),
            name: name.to_string(),
            base_rate,
            max_occupancy,
            amenities: vec!["wifi".to_string()],
        })?;
    }
    for id in 1..=12u32 {
        let floor = (id - 1) / 4 + 1;
        engine.add_room(Room {
            id: RoomId(id),
            number: format!("{floor}{:02}", (id - 1) % 4 + 1),
            category_id: CategoryId(floor),
            status: RoomStatus::Available,
            floor: floor as i16,
        })?;
    }
    for (id, name, price) in [(1, "Breakfast", dec!(18.00)), (2, "Club sandwich", dec!(14.50))] {
        engine.add_menu_item(MenuItem {
            id: MenuItemId(id),
            name: name.to_string(),
            price,
            available: true,
        })?;
    }
    Ok(())
}

// === Main ===

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let engine = Engine::builder().config(EngineConfig::from_env()).build();
    seed(&engine)?;

    let app = create_router(AppState {
        engine: Arc::new(engine),
    });

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    info!(addr = %listener.local_addr()?, "reservation API listening");
    println!("Endpoints:");
    println!("  GET   /rooms/available      - Search free rooms");
    println!("  GET   /rooms/:id            - Room details");
    println!("  POST  /bookings             - Create a booking");
    println!("  GET   /bookings/:id         - Get a booking");
    println!("  PATCH /bookings/:id/status  - Change booking status");
    println!("  POST  /orders               - Place a food order");
    println!("  PATCH /orders/:id/status    - Change order status");

    axum::serve(listener, app).await?;
    Ok(())
}
