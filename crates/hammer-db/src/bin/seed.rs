//! # Seed Data Generator
//!
//! Populates the database with a development auction for manual testing.
//!
//! ## Usage
//! ```bash
//! # Seed with defaults (120 lots, ./hammer_dev.db)
//! cargo run -p hammer-db --bin seed
//!
//! # Custom lot count and database path
//! cargo run -p hammer-db --bin seed -- --lots 500 --db ./data/hammer.db
//! ```
//!
//! ## Generated Data
//! - One auction event
//! - 12 registered buyers (paddles 101-112, a few with GSTIN and
//!   commission overrides)
//! - Catalogued lots across coin/note/stamp/medal categories
//! - Roughly two thirds of the lots hammered at plausible prices, the
//!   rest left unsold for exercising the unsold-assignment flow
//! - A handful of invoices so numbering, split and transfer have
//!   something to chew on

use std::env;

use hammer_core::{Charge, Charges, GstRate, GstType, InvoiceType, Money, NewInvoice};
use hammer_db::{Database, DbConfig, NewBuyer, NewLot};

/// Lot categories with description stems.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "coins",
        &[
            "1835 East India Company Rupee",
            "1905 Edward VII Quarter Anna",
            "1943 George VI Half Rupee",
            "1950 Republic Anna Series Set",
            "Gupta Dynasty Gold Dinar",
            "Mughal Silver Rupee, Akbar",
        ],
    ),
    (
        "notes",
        &[
            "1917 One Rupee First Issue",
            "1943 Ten Rupees George VI",
            "1962 Five Rupees Fancy Number",
            "Persian Gulf One Rupee Issue",
            "Haj Note Ten Rupees",
        ],
    ),
    (
        "stamps",
        &[
            "1854 Half Anna Lithograph",
            "1948 Gandhi Ten Rupees",
            "1929 Airmail Set on Cover",
            "Princely State Court Fee Sheet",
        ],
    ),
    (
        "medals",
        &[
            "1911 Delhi Durbar Medal",
            "Order of British India Badge",
            "1947 Independence Commemorative",
        ],
    ),
];

/// GST rates in basis points seen on auction lots.
const GST_RATES: &[u32] = &[0, 300, 500, 1200];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut lot_count: usize = 120;
    let mut db_path = String::from("./hammer_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--lots" | "-l" => {
                if i + 1 < args.len() {
                    lot_count = args[i + 1].parse().unwrap_or(120);
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
                println!("Hammer Settlement Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -l, --lots <N>     Number of lots to catalogue (default: 120)");
                println!("  -d, --db <PATH>    Database file path (default: ./hammer_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🔨 Hammer Settlement Seed Data Generator");
    println!("========================================");
    println!("Database: {}", db_path);
    println!("Lots:     {}", lot_count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if !db.auctions().list().await?.is_empty() {
        println!("⚠ Database already has auctions");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let auction = db
        .auctions()
        .create("Heritage Numismatic Auction No. 1", None)
        .await?;
    println!("✓ Auction: {}", auction.name);

    // Buyers: paddles 101-112, every third one GST-registered, a couple
    // with negotiated commission overrides.
    let mut buyers = Vec::new();
    for n in 0..12_i64 {
        let paddle = 101 + n;
        let buyer = db
            .buyers()
            .create(NewBuyer {
                auction_id: auction.id.clone(),
                paddle_number: paddle,
                name: format!("Collector {paddle}"),
                phone: Some(format!("+91-98{:08}", 10_000_000 + paddle * 137)),
                email: Some(format!("paddle{paddle}@example.in")),
                gstin: (n % 3 == 0).then(|| format!("27AAAAA{:04}A1Z5", 1000 + paddle)),
                commission_rate: (n % 5 == 0).then(|| GstRate::from_bps(1000)),
            })
            .await?;
        buyers.push(buyer);
    }
    println!("✓ Registered {} buyers", buyers.len());

    // Catalogue the lots; hammer roughly two thirds of them.
    let mut hammered: Vec<i64> = Vec::new();
    for idx in 0..lot_count {
        let lot_number = (idx + 1) as i64;
        let (category, stems) = CATEGORIES[idx % CATEGORIES.len()];
        let stem = stems[(idx / CATEGORIES.len()) % stems.len()];
        let starting = 500 + ((idx * 37) % 4500) as i64;

        db.lots()
            .create(NewLot {
                auction_id: auction.id.clone(),
                lot_number,
                description: format!("{stem} (lot {lot_number})"),
                starting_price: Some(Money::from_rupees(starting)),
                reserve_price: Some(Money::from_rupees(starting * 2)),
                category: Some(category.to_string()),
                gst_rate: GstRate::from_bps(GST_RATES[idx % GST_RATES.len()]),
            })
            .await?;

        if idx % 3 != 2 {
            let hammer = starting * 2 + ((idx * 91) % 3000) as i64;
            db.lots()
                .set_hammer_price(&auction.id, lot_number, Money::from_rupees(hammer))
                .await?;
            hammered.push(lot_number);
        }
    }
    println!(
        "✓ Catalogued {} lots ({} hammered, {} unsold)",
        lot_count,
        hammered.len(),
        lot_count - hammered.len()
    );

    // Settle the first few hammered lots onto invoices, three lots per
    // buyer, with packing on every second invoice.
    let mut invoice_count = 0;
    for (buyer_idx, chunk) in hammered.chunks(3).take(buyers.len()).enumerate() {
        let packing = (buyer_idx % 2 == 0).then_some(Charge {
            amount: Money::from_rupees(150),
            gst_rate: GstRate::from_bps(1800),
        });

        let invoice = db
            .invoices()
            .create(NewInvoice {
                auction_id: auction.id.clone(),
                invoice_type: InvoiceType::Customer,
                buyer: buyers[buyer_idx].id.clone(),
                lot_numbers: chunk.to_vec(),
                charges: Charges {
                    packing,
                    insurance: None,
                },
                gst_type: GstType::CgstSgst,
                invoice_date: None,
            })
            .await?;

        invoice_count += 1;
        if invoice_count <= 3 {
            println!(
                "  {} → paddle {} ({} lots, {})",
                invoice.invoice_number,
                buyers[buyer_idx].paddle_number,
                invoice.lots.len(),
                invoice.amounts.total_payable
            );
        }
    }
    println!("✓ Created {} invoices", invoice_count);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
