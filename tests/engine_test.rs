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

//! Engine public API integration tests.

use chrono::NaiveDate;
use hotel_reservation_rs::{
    AuditSink, BookingId, BookingStatus, CategoryId, Engine, Entity, FixedClock, GuestId,
    ReservationError, Room, RoomCategory, RoomId, RoomStatus, ValidationError,
    calculate_total_price,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

// === Helper Functions ===

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Today is 2030-06-01 for every engine built here.
fn today() -> NaiveDate {
    date(2030, 6, 1)
}

fn june(day: u32) -> NaiveDate {
    date(2030, 6, day)
}

fn make_category(id: u32, name: &str, rate: Decimal, max_occupancy: u32) -> RoomCategory {
    RoomCategory {
        id: CategoryId(id),
        name: name.to_string(),
        base_rate: rate,
        max_occupancy,
        amenities: vec!["wifi".to_string(), "tv".to_string()],
    }
}

fn make_room(id: u32, number: &str, category: u32) -> Room {
    Room {
        id: RoomId(id),
        number: number.to_string(),
        category_id: CategoryId(category),
        status: RoomStatus::Available,
        floor: 1,
    }
}

/// Two singles at 80, two doubles at 120, one suite at 300.
fn hotel() -> Engine {
    let engine = Engine::builder()
        .clock(Arc::new(FixedClock::new(today())))
        .audit(AuditSink::disabled())
        .build();
    engine.add_category(make_category(1, "Single", dec!(80), 1)).unwrap();
    engine.add_category(make_category(2, "Double", dec!(120), 2)).unwrap();
    engine.add_category(make_category(3, "Suite", dec!(300), 4)).unwrap();
    engine.add_room(make_room(1, "101", 1)).unwrap();
    engine.add_room(make_room(2, "102", 1)).unwrap();
    engine.add_room(make_room(3, "201", 2)).unwrap();
    engine.add_room(make_room(4, "202", 2)).unwrap();
    engine.add_room(make_room(5, "301", 3)).unwrap();
    engine
}

fn free_rooms(engine: &Engine, from: u32, to: u32, guests: u32) -> Vec<RoomId> {
    engine
        .search_available_rooms(june(from), june(to), guests, None)
        .unwrap()
        .into_iter()
        .map(|r| r.room.id)
        .collect()
}

// === Pricing ===

#[test]
fn two_nights_at_one_hundred() {
    let total = calculate_total_price(dec!(100), date(2024, 1, 1), date(2024, 1, 3)).unwrap();
    assert_eq!(total, dec!(200));
}

#[test]
fn one_night_minimum_stay() {
    let total = calculate_total_price(dec!(100), date(2024, 1, 1), date(2024, 1, 2)).unwrap();
    assert_eq!(total, dec!(100));
}

// === Search ===

#[test]
fn search_returns_all_free_rooms_sorted() {
    let engine = hotel();
    let rooms = engine
        .search_available_rooms(june(10), june(12), 1, None)
        .unwrap();

    let ids: Vec<_> = rooms.iter().map(|r| r.room.id).collect();
    assert_eq!(ids, vec![RoomId(1), RoomId(2), RoomId(3), RoomId(4), RoomId(5)]);
    assert!(rooms.iter().all(|r| r.nights == 2));
    assert_eq!(rooms[0].total_price, dec!(160));
    assert_eq!(rooms[4].total_price, dec!(600));
}

#[test]
fn search_respects_guest_count() {
    let engine = hotel();
    assert_eq!(free_rooms(&engine, 10, 11, 2), vec![RoomId(3), RoomId(4), RoomId(5)]);
    assert_eq!(free_rooms(&engine, 10, 11, 4), vec![RoomId(5)]);
}

#[test]
fn guest_count_beyond_every_category_is_empty_not_error() {
    let engine = hotel();
    assert!(free_rooms(&engine, 10, 11, 7).is_empty());
}

#[test]
fn search_filters_by_category() {
    let engine = hotel();
    let rooms = engine
        .search_available_rooms(june(10), june(11), 1, Some(CategoryId(2)))
        .unwrap();
    assert!(rooms.iter().all(|r| r.category.id == CategoryId(2)));
    assert_eq!(rooms.len(), 2);
}

#[test]
fn search_validation_errors() {
    let engine = hotel();
    assert!(matches!(
        engine.search_available_rooms(date(2030, 5, 31), june(2), 1, None),
        Err(ReservationError::Validation(ValidationError::PastDate { .. }))
    ));
    assert_eq!(
        engine.search_available_rooms(june(5), june(5), 1, None),
        Err(ValidationError::InvalidRange.into())
    );
    assert_eq!(
        engine.search_available_rooms(june(5), june(6), 0, None),
        Err(ValidationError::InvalidGuestCount { count: 0, max: 10 }.into())
    );
    assert_eq!(
        engine.search_available_rooms(june(5), june(6), 11, None),
        Err(ValidationError::InvalidGuestCount { count: 11, max: 10 }.into())
    );
}

#[test]
fn search_excludes_booked_rooms_only_for_overlapping_dates() {
    let engine = hotel();
    engine
        .create_booking(GuestId(1), &[RoomId(1)], june(10), june(13))
        .unwrap();

    assert!(!free_rooms(&engine, 12, 14, 1).contains(&RoomId(1)));
    assert!(!free_rooms(&engine, 8, 11, 1).contains(&RoomId(1)));
    assert!(free_rooms(&engine, 13, 15, 1).contains(&RoomId(1)));
    assert!(free_rooms(&engine, 8, 10, 1).contains(&RoomId(1)));
}

#[test]
fn search_skips_rooms_out_of_service() {
    let engine = hotel();
    engine.set_room_status(RoomId(5), RoomStatus::OutOfService).unwrap();
    assert!(free_rooms(&engine, 10, 11, 4).is_empty());

    engine.set_room_status(RoomId(5), RoomStatus::Available).unwrap();
    assert_eq!(free_rooms(&engine, 10, 11, 4), vec![RoomId(5)]);
}

// === Room details ===

#[test]
fn room_details_lookup() {
    let engine = hotel();
    let details = engine.get_room_details(RoomId(5)).unwrap();
    assert_eq!(details.room.number, "301");
    assert_eq!(details.category.name, "Suite");
    assert_eq!(
        engine.get_room_details(RoomId(99)),
        Err(ReservationError::NotFound(Entity::Room(RoomId(99))))
    );
}

// === Booking creation ===

#[test]
fn create_booking_prices_the_stay() {
    let engine = hotel();
    let booking = engine
        .create_booking(GuestId(3), &[RoomId(5)], june(10), june(14))
        .unwrap();
    assert_eq!(booking.id, BookingId(1));
    assert_eq!(booking.total_price, dec!(1200));
    assert_eq!(booking.status, BookingStatus::PendingPayment);
    assert_eq!(booking.stay.nights(), 4);
}

#[test]
fn same_day_check_out_is_a_validation_error() {
    let engine = hotel();
    assert_eq!(
        engine.create_booking(GuestId(1), &[RoomId(1)], june(10), june(10)),
        Err(ValidationError::InvalidRange.into())
    );
    assert!(engine.bookings().unwrap().is_empty());
}

#[test]
fn empty_and_duplicate_room_lists_are_rejected() {
    let engine = hotel();
    assert_eq!(
        engine.create_booking(GuestId(1), &[], june(10), june(11)),
        Err(ValidationError::EmptyRoomList.into())
    );
    assert_eq!(
        engine.create_booking(GuestId(1), &[RoomId(2), RoomId(2)], june(10), june(11)),
        Err(ValidationError::DuplicateRoom(RoomId(2)).into())
    );
}

#[test]
fn overlapping_booking_is_room_unavailable() {
    let engine = hotel();
    engine
        .create_booking(GuestId(1), &[RoomId(3)], june(10), june(12))
        .unwrap();

    let result = engine.create_booking(GuestId(2), &[RoomId(3)], june(11), june(15));
    assert_eq!(result, Err(ReservationError::RoomUnavailable { room_id: RoomId(3) }));
}

#[test]
fn back_to_back_bookings_are_allowed() {
    let engine = hotel();
    engine
        .create_booking(GuestId(1), &[RoomId(3)], june(10), june(12))
        .unwrap();
    engine
        .create_booking(GuestId(2), &[RoomId(3)], june(12), june(14))
        .unwrap();
    engine
        .create_booking(GuestId(3), &[RoomId(3)], june(8), june(10))
        .unwrap();
    assert_eq!(engine.bookings().unwrap().len(), 3);
}

#[test]
fn multi_room_booking_is_all_or_nothing() {
    let engine = hotel();
    engine
        .create_booking(GuestId(1), &[RoomId(4)], june(10), june(12))
        .unwrap();

    let result = engine.create_booking(GuestId(2), &[RoomId(3), RoomId(4)], june(11), june(13));
    assert_eq!(result, Err(ReservationError::RoomUnavailable { room_id: RoomId(4) }));

    // Room 3 was not reserved by the failed attempt.
    assert!(free_rooms(&engine, 11, 13, 1).contains(&RoomId(3)));
    assert_eq!(engine.bookings().unwrap().len(), 1);
}

#[test]
fn rooms_under_cleaning_can_still_be_booked_ahead() {
    let engine = hotel();
    engine.set_room_status(RoomId(1), RoomStatus::Cleaning).unwrap();
    assert!(
        engine
            .create_booking(GuestId(1), &[RoomId(1)], june(20), june(21))
            .is_ok()
    );
}

// === Status updates ===

#[test]
fn cancelling_confirmed_booking_frees_room_for_its_dates() {
    let engine = hotel();
    let booking = engine
        .create_booking_with_status(
            GuestId(1),
            &[RoomId(5)],
            june(10),
            june(12),
            BookingStatus::Confirmed,
        )
        .unwrap();
    assert!(!free_rooms(&engine, 10, 12, 1).contains(&RoomId(5)));

    engine
        .update_booking_status(booking.id, BookingStatus::Cancelled)
        .unwrap();
    assert!(free_rooms(&engine, 10, 12, 1).contains(&RoomId(5)));

    // Row is kept for audit.
    assert_eq!(
        engine.get_booking(booking.id).unwrap().status,
        BookingStatus::Cancelled
    );
}

#[test]
fn check_in_after_cancellation_is_a_transition_error() {
    let engine = hotel();
    let booking = engine
        .create_booking(GuestId(1), &[RoomId(1)], june(10), june(12))
        .unwrap();
    engine
        .update_booking_status(booking.id, BookingStatus::Cancelled)
        .unwrap();

    let result = engine.update_booking_status(booking.id, BookingStatus::CheckedIn);
    assert_eq!(
        result,
        Err(ReservationError::InvalidTransition {
            entity: "booking",
            from: "cancelled",
            to: "checked_in",
        })
    );
    assert_eq!(
        engine.get_booking(booking.id).unwrap().status,
        BookingStatus::Cancelled
    );
}

#[test]
fn checked_out_booking_releases_room() {
    let engine = hotel();
    let booking = engine
        .create_booking(GuestId(1), &[RoomId(2)], june(10), june(12))
        .unwrap();
    for status in [
        BookingStatus::Confirmed,
        BookingStatus::CheckedIn,
        BookingStatus::CheckedOut,
    ] {
        engine.update_booking_status(booking.id, status).unwrap();
    }
    assert!(free_rooms(&engine, 10, 12, 1).contains(&RoomId(2)));
    assert!(
        engine
            .create_booking(GuestId(2), &[RoomId(2)], june(10), june(12))
            .is_ok()
    );
}

#[test]
fn unknown_booking_is_not_found() {
    let engine = hotel();
    assert_eq!(
        engine.update_booking_status(BookingId(404), BookingStatus::Confirmed),
        Err(ReservationError::NotFound(Entity::Booking(BookingId(404))))
    );
    assert_eq!(
        engine.get_booking(BookingId(404)),
        Err(ReservationError::NotFound(Entity::Booking(BookingId(404))))
    );
}

// === Reads ===

#[test]
fn bookings_for_guest_filters() {
    let engine = hotel();
    engine
        .create_booking(GuestId(1), &[RoomId(1)], june(10), june(11))
        .unwrap();
    engine
        .create_booking(GuestId(2), &[RoomId(2)], june(10), june(11))
        .unwrap();
    engine
        .create_booking(GuestId(1), &[RoomId(3)], june(10), june(11))
        .unwrap();

    let mine = engine.bookings_for_guest(GuestId(1)).unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|b| b.guest_id == GuestId(1)));
}

#[test]
fn invalid_category_rate_is_rejected() {
    let engine = hotel();
    assert_eq!(
        engine.add_category(make_category(9, "Broken", dec!(10.001), 2)),
        Err(ValidationError::InvalidRate.into())
    );
}
