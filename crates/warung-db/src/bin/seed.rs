//! # Seed Data Generator
//!
//! Populates the database with a demo shop for development.
//!
//! ## Usage
//! ```bash
//! # Uses DATABASE_URL
//! cargo run -p warung-db --bin seed
//!
//! # Explicit database and reserve account
//! cargo run -p warung-db --bin seed -- --db postgres://localhost/warung --reserve "Modal Sisa"
//! ```
//!
//! ## Generated Data
//! - Accounts: Kas, Bank, and the reserve account, each with an opening balance
//! - Products across drinks, snacks, groceries and household goods, with
//!   stock, selling price and cost price

use anyhow::Context;
use std::env;
use warung_core::requests::{CreateAccountRequest, CreateProductRequest, UpdateAccountRequest};
use warung_core::{Money, DEFAULT_RESERVE_ACCOUNT};
use warung_db::{Database, DbConfig};

/// `(name, stock, price, cost)` with prices in whole currency units.
const PRODUCTS: &[(&str, i64, i64, i64)] = &[
    // Drinks
    ("Kopi Sachet", 120, 2_000, 1_400),
    ("Teh Botol", 48, 5_000, 3_800),
    ("Air Mineral 600ml", 96, 4_000, 2_700),
    ("Susu Kotak", 36, 6_500, 5_000),
    ("Minuman Isotonik", 24, 7_500, 5_900),
    // Snacks
    ("Keripik Singkong", 40, 10_000, 7_500),
    ("Biskuit Kelapa", 30, 8_000, 6_100),
    ("Wafer Cokelat", 45, 3_000, 2_100),
    ("Kacang Goreng", 25, 12_000, 9_000),
    // Groceries
    ("Beras 5kg", 15, 75_000, 68_000),
    ("Minyak Goreng 1L", 20, 18_000, 15_500),
    ("Gula Pasir 1kg", 25, 17_000, 15_000),
    ("Telur 1kg", 10, 29_000, 26_000),
    ("Mi Instan", 200, 3_500, 2_800),
    // Household
    ("Sabun Mandi", 30, 4_500, 3_200),
    ("Deterjen 800g", 18, 22_000, 18_500),
    ("Pasta Gigi", 20, 12_500, 9_800),
];

/// `(name, opening balance)`.
const ACCOUNTS: &[(&str, i64)] = &[("Kas", 500_000), ("Bank", 2_000_000)];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/warung".to_string());
    let mut reserve = DEFAULT_RESERVE_ACCOUNT.to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if let Some(value) = args.get(i + 1) {
                    database_url = value.clone();
                    i += 1;
                }
            }
            "--reserve" | "-r" => {
                if let Some(value) = args.get(i + 1) {
                    reserve = value.clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Warung Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <URL>        PostgreSQL URL (default: $DATABASE_URL)");
                println!("  -r, --reserve <NAME>  Reserve account name (default: {DEFAULT_RESERVE_ACCOUNT})");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Warung Seed Data Generator");
    println!("=============================");
    println!();

    let db = Database::new(DbConfig::new(&database_url))
        .await
        .context("connecting to database")?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {existing} products");
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    // Accounts
    let reserve_account = db.ledger(&reserve).ensure_reserve_account().await?;
    db.accounts()
        .update(
            reserve_account.id,
            &UpdateAccountRequest {
                name: None,
                balance: Some(Money::from_major(1_000_000)),
            },
            &reserve,
        )
        .await?;
    println!("✓ Reserve account '{}'", reserve_account.name);

    for (name, balance) in ACCOUNTS {
        let request = CreateAccountRequest {
            name: name.to_string(),
            balance: Money::from_major(*balance),
        }
        .validate()?;
        match db.accounts().create(&request).await {
            Ok(account) => println!("✓ Account '{}' = {}", account.name, account.balance),
            Err(e) => eprintln!("Failed to create account {name}: {e}"),
        }
    }

    // Products
    println!();
    println!("Generating products...");

    let mut generated = 0;
    for (name, stock, price, cost) in PRODUCTS {
        let request = CreateProductRequest {
            name: name.to_string(),
            stock: *stock,
            price: Money::from_major(*price),
            cost_price: Money::from_major(*cost),
        }
        .validate()?;

        if let Err(e) = db.products().create(&request).await {
            eprintln!("Failed to insert {name}: {e}");
            continue;
        }
        generated += 1;
    }

    println!("✓ Generated {generated} products");

    let matches = db.products().list(Some("kopi")).await?;
    println!("  Search 'kopi': {} results", matches.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
