//! # Seed Data Loader
//!
//! Loads every dashboard fixture collection into a SQLite file, so the
//! dashboard can run with `OAKLINE_STORAGE=sqlite` against realistic data.
//!
//! ## Usage
//! ```bash
//! cargo run -p oakline-db --bin seed
//! cargo run -p oakline-db --bin seed -- --db ./data/oakline.db
//! ```

use oakline_db::{Database, DbConfig};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./oakline_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Oakline Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./oakline_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("Oakline Seed Data Loader");
    println!("========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let start = std::time::Instant::now();
    let report = db.seed_fixtures().await?;

    if report.skipped {
        println!("⚠ Database already has records");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        db.close().await;
        return Ok(());
    }

    println!();
    for (kind, count) in &report.inserted {
        println!("  {:<20} {:>4}", kind, count);
    }
    println!();
    println!("✓ Seeded {} records in {:?}", report.total(), start.elapsed());

    db.close().await;
    Ok(())
}
