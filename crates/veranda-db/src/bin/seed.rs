//! # Seed Data Generator
//!
//! Populates the database with rooms and rates for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default dev database
//! cargo run -p veranda-db --bin seed
//!
//! # Custom room count / database path
//! cargo run -p veranda-db --bin seed -- --rooms 40
//! cargo run -p veranda-db --bin seed -- --db ./data/veranda.db
//! ```
//!
//! ## Generated Data
//! - One branch worth of rooms, labelled by floor: `101`..`1xx`, `201`.. etc.
//! - A small rate card: hourly blocks with excess pricing plus a flat
//!   overnight rate with none.
//! - Every room offers every hourly rate; overnight is offered only on
//!   the upper floors.

use chrono::Utc;
use std::env;
use uuid::Uuid;
use veranda_core::{
    CleaningStatus, Rate, RateLifecycle, Room, RoomAvailability, RoomLifecycle, DEFAULT_TENANT_ID,
};
use veranda_db::{Database, DbConfig};

/// Branch the dev data belongs to.
const DEV_BRANCH_ID: &str = "00000000-0000-0000-0000-0000000000b1";

/// Rate card: (name, price cents, included hours, excess cents per hour).
const RATE_CARD: &[(&str, i64, i64, Option<i64>)] = &[
    ("3 Hour Block", 50_000, 3, Some(10_000)),
    ("6 Hour Block", 80_000, 6, Some(10_000)),
    ("12 Hour Block", 120_000, 12, Some(8_000)),
    ("Overnight Flat", 150_000, 14, None),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut room_count: usize = 24;
    let mut db_path = String::from("./veranda_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rooms" | "-r" => {
                if i + 1 < args.len() {
                    room_count = args[i + 1].parse().unwrap_or(24);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Veranda Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -r, --rooms <N>    Number of rooms to generate (default: 24)");
                println!("  -d, --db <PATH>    Database file path (default: ./veranda_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Veranda Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Rooms:    {}", room_count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Refuse to double-seed
    let existing = db.rooms().list_for_branch(DEV_BRANCH_ID).await?;
    if !existing.is_empty() {
        println!("⚠ Branch already has {} rooms", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Rates first, rooms reference them through the compatibility set
    println!();
    println!("Generating rate card...");

    let now = Utc::now();
    let mut rate_ids: Vec<String> = Vec::new();

    for (name, price_cents, included_hours, excess_price_cents) in RATE_CARD {
        let rate = Rate {
            id: Uuid::new_v4().to_string(),
            branch_id: DEV_BRANCH_ID.to_string(),
            name: name.to_string(),
            lifecycle: RateLifecycle::Active,
            price_cents: *price_cents,
            included_hours: *included_hours,
            excess_price_cents: *excess_price_cents,
            created_at: now,
            updated_at: now,
        };
        db.rates().insert(&rate).await?;
        rate_ids.push(rate.id);
    }
    println!("  {} rates", rate_ids.len());

    println!("Generating rooms...");
    let start = std::time::Instant::now();
    let rooms_per_floor = 12;

    for idx in 0..room_count {
        let floor = idx / rooms_per_floor + 1;
        let door = idx % rooms_per_floor + 1;
        let label = format!("{}{:02}", floor, door);

        let room = Room {
            id: Uuid::new_v4().to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            branch_id: DEV_BRANCH_ID.to_string(),
            label: label.clone(),
            lifecycle: RoomLifecycle::Active,
            availability: RoomAvailability::Available,
            cleaning: CleaningStatus::Clean,
            bound_booking_id: None,
            created_at: now,
            updated_at: now,
        };
        db.rooms().insert(&room).await?;

        // Hourly blocks everywhere; overnight on floor 2 and up.
        let offered: Vec<String> = if floor >= 2 {
            rate_ids.clone()
        } else {
            rate_ids[..3].to_vec()
        };
        db.rooms().set_compatible_rates(&room.id, &offered).await?;

        if (idx + 1) % 10 == 0 {
            println!("  Generated {} rooms...", idx + 1);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} rooms in {:?}", room_count, elapsed);

    // Read the card back the way the front desk will see it
    println!();
    println!("Active rate card:");
    for rate in db.rates().list_active_for_branch(DEV_BRANCH_ID).await? {
        println!(
            "  {:<16} {:>10}  {}h included{}",
            rate.name,
            rate.price(),
            rate.included_hours,
            match rate.excess_price() {
                Some(excess) => format!(", then {excess}/h"),
                None => String::new(),
            }
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
