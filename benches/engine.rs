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

//! Benchmarks for the reservation engine.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Stay pricing
//! - Availability search as the booking table grows
//! - Single-threaded booking creation and status changes
//! - Multi-threaded booking creation, contended and uncontended

use chrono::{NaiveDate, TimeDelta};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use hotel_reservation_rs::{
    AuditSink, BookingStatus, CategoryId, Engine, FixedClock, GuestId, Room, RoomCategory, RoomId,
    RoomStatus, calculate_total_price,
};
use rayon::prelude::*;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

// =============================================================================
// Helper Functions
// =============================================================================

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
}

fn day(offset: u32) -> NaiveDate {
    today() + TimeDelta::days(i64::from(offset))
}

/// Engine with `rooms` rooms spread over three categories.
fn make_engine(rooms: u32) -> Engine {
    let engine = Engine::builder()
        .clock(Arc::new(FixedClock::new(today())))
        .audit(AuditSink::disabled())
        .build();
    for (id, rate, occupancy) in [(1, dec!(80), 1), (2, dec!(120), 2), (3, dec!(300), 4)] {
        engine
            .add_category(RoomCategory {
                id: CategoryId(id),
                name: format!("category-{id}"),
                base_rate: rate,
                max_occupancy: occupancy,
                amenities: Vec::new(),
            })
            .unwrap();
    }
    for id in 1..=rooms {
        engine
            .add_room(Room {
                id: RoomId(id),
                number: id.to_string(),
                category_id: CategoryId(id % 3 + 1),
                status: RoomStatus::Available,
                floor: (id / 20) as i16,
            })
            .unwrap();
    }
    engine
}

/// Fills every room with back-to-back two-night stays.
fn fill_bookings(engine: &Engine, rooms: u32, per_room: u32) {
    for room in 1..=rooms {
        for i in 0..per_room {
            engine
                .create_booking(GuestId(room), &[RoomId(room)], day(i * 2), day(i * 2 + 2))
                .unwrap();
        }
    }
}

// =============================================================================
// Pricing
// =============================================================================

fn bench_pricing(c: &mut Criterion) {
    c.bench_function("calculate_total_price", |b| {
        b.iter(|| calculate_total_price(black_box(dec!(129.99)), day(3), day(10)).unwrap())
    });
}

// =============================================================================
// Search
// =============================================================================

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_available_rooms");

    for per_room in [0u32, 10, 100] {
        let engine = make_engine(100);
        fill_bookings(&engine, 100, per_room);
        group.throughput(Throughput::Elements(100));
        group.bench_with_input(
            BenchmarkId::new("bookings_per_room", per_room),
            &engine,
            |b, engine| {
                b.iter(|| {
                    engine
                        .search_available_rooms(black_box(day(9)), day(12), 2, None)
                        .unwrap()
                })
            },
        );
    }
    group.finish();
}

// =============================================================================
// Single-Threaded Booking
// =============================================================================

fn bench_single_booking(c: &mut Criterion) {
    c.bench_function("single_booking", |b| {
        b.iter(|| {
            let engine = make_engine(1);
            engine
                .create_booking(GuestId(1), black_box(&[RoomId(1)]), day(1), day(3))
                .unwrap();
        })
    });
}

fn bench_booking_lifecycle(c: &mut Criterion) {
    c.bench_function("booking_lifecycle", |b| {
        b.iter(|| {
            let engine = make_engine(1);
            let booking = engine
                .create_booking(GuestId(1), &[RoomId(1)], day(1), day(3))
                .unwrap();
            for status in [
                BookingStatus::Confirmed,
                BookingStatus::CheckedIn,
                BookingStatus::CheckedOut,
            ] {
                engine.update_booking_status(booking.id, status).unwrap();
            }
            black_box(&engine);
        })
    });
}

fn bench_booking_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("booking_throughput");

    for count in [100u32, 1_000] {
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let engine = make_engine(10);
                for i in 0..count {
                    let room = RoomId(i % 10 + 1);
                    let start = i / 10;
                    engine
                        .create_booking(GuestId(i), &[room], day(start), day(start + 1))
                        .unwrap();
                }
                black_box(&engine);
            })
        });
    }
    group.finish();
}

// =============================================================================
// Multi-Threaded Booking
// =============================================================================

fn bench_parallel_distinct_rooms(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_distinct_rooms");

    for rooms in [8u32, 64] {
        group.throughput(Throughput::Elements(u64::from(rooms) * 20));
        group.bench_with_input(BenchmarkId::from_parameter(rooms), &rooms, |b, &rooms| {
            b.iter(|| {
                let engine = make_engine(rooms);
                (1..=rooms).into_par_iter().for_each(|room| {
                    for night in 0..20 {
                        engine
                            .create_booking(
                                GuestId(room),
                                &[RoomId(room)],
                                day(night),
                                day(night + 1),
                            )
                            .unwrap();
                    }
                });
                black_box(&engine);
            })
        });
    }
    group.finish();
}

fn bench_parallel_contended_room(c: &mut Criterion) {
    c.bench_function("parallel_contended_room", |b| {
        b.iter(|| {
            let engine = make_engine(1);
            let won = AtomicU32::new(0);
            (0..256u32).into_par_iter().for_each(|guest| {
                if engine
                    .create_booking(GuestId(guest), &[RoomId(1)], day(5), day(7))
                    .is_ok()
                {
                    won.fetch_add(1, Ordering::Relaxed);
                }
            });
            assert_eq!(won.load(Ordering::Relaxed), 1);
        })
    });
}

criterion_group!(
    benches,
    bench_pricing,
    bench_search,
    bench_single_booking,
    bench_booking_lifecycle,
    bench_booking_throughput,
    bench_parallel_distinct_rooms,
    bench_parallel_contended_room,
);
criterion_main!(benches);
