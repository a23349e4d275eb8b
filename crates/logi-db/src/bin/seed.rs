//! # Seed Data Generator
//!
//! Populates the database with demo operation records for development.
//!
//! ## Usage
//! ```bash
//! # Generate 120 operations across 2026 (default)
//! cargo run -p logi-db --bin seed
//!
//! # Generate a custom amount for another year
//! cargo run -p logi-db --bin seed -- --count 500 --year 2025
//!
//! # Specify database path
//! cargo run -p logi-db --bin seed -- --db ./data/logi.db
//! ```
//!
//! Each record gets:
//! - First-mile master `FM-{YEAR}-{INDEX}` and last-mile master `LM-{INDEX}`
//! - A last-mile date spread over the twelve months, first mile 1-3 days earlier
//! - Packages 50-449, weight 10-409 kg, crew of 2-5
//! - Derived fields computed with the live rates

use chrono::{Days, NaiveDate};
use std::env;

use logi_core::{compute, month_label, Money, OperationInput};
use logi_db::{Database, DbConfig};

const FREIGHT_TYPES: &[&str] = &["Nacional", "Local", "Foraneo"];

const TRUCK_TYPES: &[&str] = &["Rabon", "Torton", "Trailer 53", "Camioneta 3.5"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 120;
    let mut year: i32 = 2026;
    let mut db_path = String::from("./logi_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = parse_or_default("--count", &args[i + 1], 120);
                    i += 1;
                }
            }
            "--year" | "-y" => {
                if i + 1 < args.len() {
                    year = parse_or_default("--year", &args[i + 1], 2026);
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
                println!("Logi Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of operations to generate (default: 120)");
                println!("  -y, --year <YEAR>  Calendar year to spread them over (default: 2026)");
                println!("  -d, --db <PATH>    Database file path (default: ./logi_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Logi Seed Data Generator");
    println!("========================");
    println!("Database:   {}", db_path);
    println!("Operations: {}", count);
    println!("Year:       {}", year);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.operations().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} operations", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let rates = db.rates().current_rates().await;
    println!(
        "✓ Using rates: CC {} / package, ADIMEX {} / kg",
        rates.cc_rate, rates.adimex_rate
    );
    println!();
    println!("Generating operations...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let Some(input) = generate_operation(year, seed) else {
            eprintln!("Year {} is out of range", year);
            break;
        };
        let derived = compute(&input, rates);

        if let Err(e) = db.operations().insert(&input, &derived, rates, None).await {
            eprintln!("Failed to insert {}: {}", input.first_mile_master, e);
            continue;
        }

        generated += 1;
        if generated % 50 == 0 {
            println!("  Generated {} operations...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} operations in {:?}", generated, elapsed);
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Parses an option value, warning and keeping the default when it's bad.
fn parse_or_default<T>(flag: &str, raw: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            eprintln!("⚠ Invalid value '{}' for {}, using {}", raw, flag, default);
            default
        }
    }
}

/// Generates one operation with varied but deterministic figures.
fn generate_operation(year: i32, seed: usize) -> Option<OperationInput> {
    let month = (seed % 12) as u32 + 1;
    let day = (seed * 7 % 27) as u32 + 2;
    let last_mile_date = NaiveDate::from_ymd_opt(year, month, day)?;
    let first_mile_date = last_mile_date.checked_sub_days(Days::new((seed % 3) as u64 + 1))?;

    let packages = 50 + (seed * 37 % 400) as i64;
    let weight_kg = 10.0 + (seed * 53 % 400) as f64;
    let crew_size = 2 + (seed % 4) as i64;

    Some(OperationInput {
        month: month_label(last_mile_date).to_string(),
        first_mile_date,
        first_mile_master: format!("FM-{}-{:04}", year, seed),
        last_mile_date,
        last_mile_master: format!("LM-{:04}", seed),
        boxes: packages / 10 + 1,
        packages,
        weight_kg,
        crew_size,
        crew_cost: Money::new(crew_size as f64 * 45.0),
        forklift_cost: Money::new(if seed % 2 == 0 { 60.0 } else { 0.0 }),
        yale_cost: Money::new(if seed % 3 == 0 { 35.0 } else { 0.0 }),
        extraordinary_cost: Money::new(if seed % 10 == 0 { 120.0 } else { 0.0 }),
        freight_type: FREIGHT_TYPES[seed % FREIGHT_TYPES.len()].to_string(),
        truck_type: TRUCK_TYPES[seed % TRUCK_TYPES.len()].to_string(),
        subcontract_freight_cost: Money::new(25.0 + (seed * 11 % 90) as f64),
        adimex_paid: Money::new((weight_kg * 0.33 * 100.0).round() / 100.0),
    })
}
