//! # Seed Data Generator
//!
//! Populates the store with a demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p orderflow-store --bin seed
//!
//! # Specify database path
//! cargo run -p orderflow-store --bin seed -- --db ./data/orderflow.db
//!
//! # Also create a demo customer with a login
//! cargo run -p orderflow-store --bin seed -- --with-customer
//! ```

use chrono::Utc;
use std::env;

use orderflow_core::auth::hash_password;
use orderflow_core::types::{generate_id, Customer, Product};
use orderflow_store::{Store, StoreConfig};

/// Demo catalog: (name, description, category, price_cents, quantity).
const CATALOG: &[(&str, &str, &str, i64, i64)] = &[
    ("Espresso Beans 1kg", "Dark roast arabica", "Coffee", 1899, 40),
    ("Filter Roast 500g", "Medium roast blend", "Coffee", 999, 60),
    ("Cold Brew Kit", "Slow-steep brewer with filters", "Equipment", 3499, 15),
    ("Ceramic Mug", "350ml stoneware mug", "Accessories", 1250, 120),
    ("Travel Tumbler", "Insulated 450ml tumbler", "Accessories", 2199, 80),
    ("Hand Grinder", "Steel burr hand grinder", "Equipment", 4599, 25),
    ("Gooseneck Kettle", "1L pour-over kettle", "Equipment", 5899, 10),
    ("Paper Filters x100", "Size 02 bleached filters", "Consumables", 549, 200),
    ("Decaf Blend 500g", "Swiss water process", "Coffee", 1099, 35),
    ("Sample Pack", "Four 100g single origins", "Coffee", 1599, 50),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./orderflow_dev.db");
    let mut with_customer = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--with-customer" => {
                with_customer = true;
            }
            "--help" | "-h" => {
                println!("Orderflow Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./orderflow_dev.db)");
                println!("      --with-customer  Also create demo@example.local / demo123");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Orderflow Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let store = Store::new(StoreConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = store.products().count().await?;
    if existing > 0 {
        println!("⚠ Catalog already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding catalog...");

    let now = Utc::now();
    for (name, description, category, price_cents, quantity) in CATALOG {
        let product = Product {
            product_id: generate_id(),
            name: name.to_string(),
            description: description.to_string(),
            price_cents: *price_cents,
            category: category.to_string(),
            image_url: None,
            thumbnail_url: None,
            quantity: *quantity,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        store.products().upsert(&product).await?;
        println!("  + {name}");
    }

    if with_customer {
        let customer = Customer {
            customer_id: "demo@example.local".to_string(),
            name: "Demo Customer".to_string(),
            email: "demo@example.local".to_string(),
            shipping_address: "1 Demo Street".to_string(),
            password_hash: hash_password("demo123"),
            disabled: false,
        };
        store.customers().insert(&customer).await?;
        println!("  + demo@example.local (password: demo123)");
    }

    println!();
    println!("✓ Seed complete: {} products", CATALOG.len());

    Ok(())
}
