//! # Seed Data Generator
//!
//! Fills the local catalog with farm products for development and offline
//! demos.
//!
//! ## Usage
//! ```bash
//! cargo run -p farmease-store --bin seed
//! cargo run -p farmease-store --bin seed -- --db ./data/farmease.db
//! ```
//!
//! ## Generated Products
//! - Rental Equipment (daily rate in the price, a few machines each)
//! - Organic Produce
//! - Fruits and Vegetables

use std::env;

use farmease_core::validation::{validate_display_price, validate_product_name, validate_stock};
use farmease_core::{Product, ProductCategory};
use farmease_store::{Database, DbConfig};
use uuid::Uuid;

/// (category, [(name, display price, stock)])
const CATALOG: &[(&str, &[(&str, &str, i64)])] = &[
    (
        "Rental Equipment",
        &[
            ("Mini Tractor", "₹1,500", 2),
            ("Power Tiller", "₹800", 3),
            ("Seed Drill", "₹650", 4),
            ("Rotavator", "₹900", 2),
            ("Sprayer Pump", "₹150", 10),
            ("Combine Harvester", "₹6,000", 1),
        ],
    ),
    (
        "Organic Produce",
        &[
            ("Organic Basmati Rice (1kg)", "₹120", 40),
            ("Organic Wheat Flour (5kg)", "₹320", 25),
            ("Cold Pressed Mustard Oil (1L)", "₹240.50", 18),
            ("Raw Forest Honey (500g)", "₹399", 12),
            ("Organic Jaggery (1kg)", "₹95", 30),
            ("Toor Dal (1kg)", "₹165.75", 22),
        ],
    ),
    (
        "Fruits and Vegetables",
        &[
            ("Alphonso Mango (1 dozen)", "₹650", 15),
            ("Tomatoes (1kg)", "₹45.99", 60),
            ("Red Onions (1kg)", "₹38", 80),
            ("Potatoes (1kg)", "₹30", 100),
            ("Fresh Spinach (bunch)", "₹20", 35),
            ("Bananas (1 dozen)", "₹55", 0),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./farmease_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if let Some(path) = args.get(i + 1) {
                    db_path = path.clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("FarmEase Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./farmease_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 FarmEase Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let mut generated = 0;
    for (category, products) in CATALOG {
        for (name, price, stock) in products.iter() {
            validate_product_name(name)?;
            validate_display_price(price)?;
            validate_stock(*stock)?;

            let product = Product {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                price: price.to_string(),
                image: format!("/images/{}.jpg", slug(name)),
                category: ProductCategory::from_name(category),
                stock: *stock,
                description: None,
                seller_id: None,
            };

            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", product.name, e);
                continue;
            }
            generated += 1;
        }
        println!("  {}: {} products", category, products.len());
    }

    println!();
    println!("✓ Generated {} products", generated);

    let rentals = db
        .products()
        .list_by_category(&ProductCategory::RentalEquipment, 100)
        .await?;
    println!("  Rentable machines: {}", rentals.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// "Mini Tractor" → "mini-tractor"
fn slug(name: &str) -> String {
    name.chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if c == ' ' {
                Some('-')
            } else {
                None
            }
        })
        .collect()
}
