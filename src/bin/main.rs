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

use chrono::NaiveDate;
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use hotel_reservation_rs::{
    BookingId, BookingStatus, CategoryId, Clock, Engine, EngineConfig, FixedClock, GuestId,
    ReservationError, Room, RoomCategory, RoomId, RoomStatus, SystemClock,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Reservation Engine - Replay booking command CSV files
///
/// Loads a room inventory, applies booking and status commands in order,
/// and writes the resulting bookings to stdout.
#[derive(Parser, Debug)]
#[command(name = "hotel-reservation-rs")]
#[command(about = "Replays booking commands against a room inventory", long_about = None)]
struct Args {
    /// Path to the room inventory CSV
    ///
    /// Expected format: room,number,floor,status,category,category_name,rate,max_occupancy
    #[arg(long, value_name = "FILE")]
    rooms: PathBuf,

    /// Path to the booking commands CSV
    ///
    /// Expected format: op,booking,guest,rooms,check_in,check_out,status
    /// Example: cargo run -- --rooms rooms.csv commands.csv > bookings.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Date treated as today (YYYY-MM-DD); defaults to the system date
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Longest wait for a room lock, in milliseconds
    #[arg(long)]
    lock_timeout_ms: Option<u64>,

    /// Retries after lock contention
    #[arg(long)]
    max_retries: Option<u32>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Reservation(#[from] ReservationError),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hotel_reservation_rs=info,audit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let mut config = EngineConfig::from_env();
    if let Some(ms) = args.lock_timeout_ms {
        config.lock_timeout = Duration::from_millis(ms);
    }
    if let Some(retries) = args.max_retries {
        config.max_conflict_retries = retries;
    }
    let clock: Arc<dyn Clock> = match args.today {
        Some(today) => Arc::new(FixedClock::new(today)),
        None => Arc::new(SystemClock),
    };
    let engine = Engine::builder().config(config).clock(clock).build();

    let rooms = File::open(&args.rooms)?;
    let loaded = load_inventory(&engine, BufReader::new(rooms))?;
    info!(rooms = loaded, path = %args.rooms.display(), "inventory loaded");

    let commands = File::open(&args.input)?;
    process_commands(&engine, BufReader::new(commands))?;

    write_bookings(&engine, io::stdout())
}

/// Inventory row: one room plus its category.
#[derive(Debug, Deserialize)]
struct InventoryRecord {
    room: u32,
    number: String,
    floor: i16,
    status: RoomStatus,
    category: u32,
    category_name: String,
    rate: Decimal,
    max_occupancy: u32,
}

/// Loads rooms and categories, returning the number of rooms added.
///
/// A category may repeat across rows but must carry the same name, rate and
/// occupancy each time; rows that disagree with the first definition are
/// skipped, as are invalid rows.
fn load_inventory<R: Read>(engine: &Engine, reader: R) -> Result<usize, CliError> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .has_headers(true)
        .from_reader(reader);

    let mut categories: HashMap<CategoryId, RoomCategory> = HashMap::new();
    let mut loaded = 0;
    for result in rdr.deserialize::<InventoryRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "skipping malformed inventory row");
                continue;
            }
        };
        let category = RoomCategory {
            id: CategoryId(record.category),
            name: record.category_name,
            base_rate: record.rate,
            max_occupancy: record.max_occupancy,
            amenities: Vec::new(),
        };
        let room = Room {
            id: RoomId(record.room),
            number: record.number,
            category_id: CategoryId(record.category),
            status: record.status,
            floor: record.floor,
        };
        let outcome = match categories.get(&category.id) {
            Some(known) if *known != category => {
                warn!(
                    room = record.room,
                    category = record.category,
                    "category conflicts with an earlier row, skipping"
                );
                continue;
            }
            Some(_) => engine.add_room(room),
            None => engine.add_category(category.clone()).and_then(|()| {
                categories.insert(category.id, category);
                engine.add_room(room)
            }),
        };
        match outcome {
            Ok(()) => loaded += 1,
            Err(e) => warn!(room = record.room, error = %e, "skipping inventory row"),
        }
    }
    Ok(loaded)
}

/// Raw command row.
///
/// Fields: `op, booking, guest, rooms, check_in, check_out, status`
#[derive(Debug, Deserialize)]
struct CommandRecord {
    op: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    booking: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    guest: Option<u32>,
    #[serde(default)]
    rooms: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    check_in: Option<NaiveDate>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    check_out: Option<NaiveDate>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    status: Option<BookingStatus>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Book {
        guest_id: GuestId,
        room_ids: Vec<RoomId>,
        check_in: NaiveDate,
        check_out: NaiveDate,
        status: BookingStatus,
    },
    Status {
        booking_id: BookingId,
        status: BookingStatus,
    },
}

impl CommandRecord {
    /// Returns `None` for unknown ops or missing required fields.
    fn into_command(self) -> Option<Command> {
        match self.op.to_lowercase().as_str() {
            "book" => {
                let room_ids = self
                    .rooms
                    .split(|c: char| c == ';' || c.is_whitespace())
                    .filter(|s| !s.is_empty())
                    .map(|s| s.parse().map(RoomId))
                    .collect::<Result<Vec<_>, _>>()
                    .ok()?;
                Some(Command::Book {
                    guest_id: GuestId(self.guest?),
                    room_ids,
                    check_in: self.check_in?,
                    check_out: self.check_out?,
                    status: self.status.unwrap_or(BookingStatus::PendingPayment),
                })
            }
            "status" => Some(Command::Status {
                booking_id: BookingId(self.booking?),
                status: self.status?,
            }),
            _ => None,
        }
    }
}

/// Applies commands in file order.
///
/// Malformed rows and rejected commands are logged and skipped; only a
/// broken reader stops processing.
fn process_commands<R: Read>(engine: &Engine, reader: R) -> Result<(), CliError> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for result in rdr.deserialize::<CommandRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "skipping malformed command row");
                continue;
            }
        };
        let Some(command) = record.into_command() else {
            warn!("skipping invalid command record");
            continue;
        };

        let outcome = match command {
            Command::Book {
                guest_id,
                room_ids,
                check_in,
                check_out,
                status,
            } => engine
                .create_booking_with_status(guest_id, &room_ids, check_in, check_out, status)
                .map(|_| ()),
            Command::Status { booking_id, status } => engine
                .update_booking_status(booking_id, status)
                .map(|_| ()),
        };
        if let Err(e) = outcome {
            warn!(error = %e, "command rejected");
        }
    }

    Ok(())
}

/// Output row for one booking.
#[derive(Debug, Serialize)]
struct BookingRow {
    booking: BookingId,
    guest: GuestId,
    check_in: NaiveDate,
    check_out: NaiveDate,
    status: BookingStatus,
    nights: u32,
    total: Decimal,
    rooms: String,
}

/// Writes every booking, in creation order, as CSV.
///
/// # CSV Format
///
/// Columns: `booking, guest, check_in, check_out, status, nights, total, rooms`
///
/// ```csv
/// booking,guest,check_in,check_out,status,nights,total,rooms
/// 1,7,2030-01-10,2030-01-12,confirmed,2,240.00,1 2
/// ```
fn write_bookings<W: Write>(engine: &Engine, writer: W) -> Result<(), CliError> {
    let mut wtr = Writer::from_writer(writer);

    for booking in engine.bookings()? {
        let rooms = booking
            .room_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        wtr.serialize(BookingRow {
            booking: booking.id,
            guest: booking.guest_id,
            check_in: booking.stay.check_in(),
            check_out: booking.stay.check_out(),
            status: booking.status,
            nights: booking.stay.nights(),
            total: booking.total_price,
            rooms,
        })?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotel_reservation_rs::AuditSink;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    const INVENTORY: &str = "room,number,floor,status,category,category_name,rate,max_occupancy\n\
                             1,101,1,available,1,Standard,100.00,2\n\
                             2,102,1,available,1,Standard,100.00,2\n\
                             3,201,2,cleaning,2,Suite,250.00,4\n";

    fn engine() -> Engine {
        let engine = Engine::builder()
            .clock(Arc::new(FixedClock::new(
                NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            )))
            .audit(AuditSink::disabled())
            .build();
        load_inventory(&engine, Cursor::new(INVENTORY)).unwrap();
        engine
    }

    fn run_commands(csv: &str) -> Engine {
        let engine = engine();
        process_commands(&engine, Cursor::new(csv)).unwrap();
        engine
    }

    #[test]
    fn loads_inventory() {
        let engine = engine();
        let suite = engine.get_room_details(RoomId(3)).unwrap();
        assert_eq!(suite.room.status, RoomStatus::Cleaning);
        assert_eq!(suite.category.base_rate, dec!(250.00));
    }

    #[test]
    fn skips_bad_inventory_rows() {
        let engine = Engine::builder().audit(AuditSink::disabled()).build();
        let csv = "room,number,floor,status,category,category_name,rate,max_occupancy\n\
                   1,101,1,available,1,Standard,100.00,2\n\
                   2,102,1,flooded,1,Standard,100.00,2\n\
                   3,103,1,available,1,Standard,99.999,2\n";
        let loaded = load_inventory(&engine, Cursor::new(csv)).unwrap();
        assert_eq!(loaded, 1);
    }

    #[test]
    fn conflicting_category_rows_are_skipped() {
        let engine = Engine::builder().audit(AuditSink::disabled()).build();
        let csv = "room,number,floor,status,category,category_name,rate,max_occupancy\n\
                   1,101,1,available,1,Standard,100.00,2\n\
                   2,102,1,available,1,Standard,150.00,2\n\
                   3,103,1,available,1,Standard,100.00,2\n";
        let loaded = load_inventory(&engine, Cursor::new(csv)).unwrap();
        assert_eq!(loaded, 2);
        assert!(engine.get_room_details(RoomId(2)).is_err());
        let details = engine.get_room_details(RoomId(3)).unwrap();
        assert_eq!(details.category.base_rate, dec!(100.00));
    }

    #[test]
    fn parse_simple_booking() {
        let engine = run_commands(
            "op,booking,guest,rooms,check_in,check_out,status\n\
             book,,7,1,2030-01-10,2030-01-12,\n",
        );
        let booking = engine.get_booking(BookingId(1)).unwrap();
        assert_eq!(booking.guest_id, GuestId(7));
        assert_eq!(booking.total_price, dec!(200.00));
        assert_eq!(booking.status, BookingStatus::PendingPayment);
    }

    #[test]
    fn parse_multi_room_booking_with_status() {
        let engine = run_commands(
            "op,booking,guest,rooms,check_in,check_out,status\n\
             book,,7,1;2,2030-01-10,2030-01-11,confirmed\n",
        );
        let booking = engine.get_booking(BookingId(1)).unwrap();
        assert_eq!(booking.room_ids, vec![RoomId(1), RoomId(2)]);
        assert_eq!(booking.status, BookingStatus::Confirmed);
    }

    #[test]
    fn overlapping_booking_is_skipped() {
        let engine = run_commands(
            "op,booking,guest,rooms,check_in,check_out,status\n\
             book,,1,1,2030-01-10,2030-01-12,\n\
             book,,2,1,2030-01-11,2030-01-13,\n",
        );
        assert_eq!(engine.bookings().unwrap().len(), 1);
    }

    #[test]
    fn cancellation_frees_room_for_later_command() {
        let engine = run_commands(
            "op,booking,guest,rooms,check_in,check_out,status\n\
             book,,1,1,2030-01-10,2030-01-12,\n\
             status,1,,,,,cancelled\n\
             book,,2,1,2030-01-11,2030-01-13,\n",
        );
        let bookings = engine.bookings().unwrap();
        assert_eq!(bookings.len(), 2);
        assert_eq!(bookings[0].status, BookingStatus::Cancelled);
        assert_eq!(bookings[1].guest_id, GuestId(2));
    }

    #[test]
    fn parse_with_whitespace() {
        let engine = run_commands(
            "op,booking,guest,rooms,check_in,check_out,status\n \
             book , , 3 , 2 , 2030-01-10 , 2030-01-11 , \n",
        );
        assert_eq!(engine.bookings().unwrap().len(), 1);
    }

    #[test]
    fn skip_malformed_rows() {
        let engine = run_commands(
            "op,booking,guest,rooms,check_in,check_out,status\n\
             book,,1,1,2030-01-10,2030-01-12,\n\
             teleport,row,data,here,,,\n\
             book,,2,x,2030-01-10,2030-01-12,\n\
             status,1,,,,,levitating\n\
             book,,3,2,2030-01-10,2030-01-12,\n",
        );
        assert_eq!(engine.bookings().unwrap().len(), 2);
    }

    #[test]
    fn write_bookings_to_csv() {
        let engine = run_commands(
            "op,booking,guest,rooms,check_in,check_out,status\n\
             book,,7,2;1,2030-01-10,2030-01-12,confirmed\n",
        );

        let mut output = Vec::new();
        write_bookings(&engine, &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(
            output_str,
            "booking,guest,check_in,check_out,status,nights,total,rooms\n\
             1,7,2030-01-10,2030-01-12,confirmed,2,400.00,1 2\n"
        );
    }
}
