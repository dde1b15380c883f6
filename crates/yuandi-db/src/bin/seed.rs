//! # Seed Data Generator
//!
//! Populates the database with sample catalog data for development.
//!
//! ## Usage
//! ```bash
//! # Generate 50 products (default)
//! cargo run -p yuandi-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p yuandi-db --bin seed -- --count 200
//!
//! # Specify database path
//! cargo run -p yuandi-db --bin seed -- --db ./data/yuandi.db
//! ```
//!
//! ## Generated Data
//! Creates luxury-goods catalog entries across categories (bags, wallets,
//! shoes, watches, accessories). Each product gets:
//! - A generated SKU from its category/model/color/brand fields
//! - A cost in CNY fen and a sale price in KRW won
//! - An opening inbound stock movement (so the ledger starts consistent)

use std::env;

use tracing::error;

use yuandi_core::NewProduct;
use yuandi_db::{Database, DbConfig};

/// (category, brand, models) triples for sample data
const CATALOG: &[(&str, &str, &[&str])] = &[
    (
        "bag",
        "Chanel",
        &["Classic Flap", "Boy", "19", "2.55", "Gabrielle"],
    ),
    (
        "bag",
        "Louis Vuitton",
        &["Speedy 25", "Neverfull MM", "Alma BB", "Capucines"],
    ),
    ("wallet", "Gucci", &["Marmont", "Ophidia", "GG Supreme"]),
    ("shoes", "Prada", &["Monolith", "Cloudbust", "America's Cup"]),
    ("watch", "Cartier", &["Tank Must", "Santos", "Ballon Bleu"]),
    (
        "acc",
        "Hermes",
        &["Twilly", "Clic H", "Oran Sandal", "Carre 90"],
    ),
];

const COLORS: &[&str] = &["black", "brown", "beige", "white", "red", "navy", "gold"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = String::from("./yuandi_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(50);
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
                println!("YUANDI Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./yuandi_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 YUANDI Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database (runs migrations)
    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0usize;
    let start = std::time::Instant::now();

    'outer: for (category, brand, models) in CATALOG {
        for model in *models {
            for (color_idx, color) in COLORS.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let new = sample_product(category, brand, model, color, generated + color_idx);

                let product = match db.products().create(new).await {
                    Ok(p) => p,
                    Err(e) => {
                        error!(%brand, %model, %color, "Failed to insert product: {e}");
                        continue;
                    }
                };

                // Opening stock so the ledger starts with a consistent chain
                let opening = 2 + ((generated * 7) % 15) as i64;
                db.inventory()
                    .receive(&product.id, opening, Some("seed"))
                    .await?;

                generated += 1;

                if generated % 25 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    // Spot-check the catalog and the low-stock listing
    let hits = db.products().search("chanel", 10).await?;
    println!("  Search 'chanel': {} results", hits.len());

    let low = db.products().list_low_stock(10).await?;
    println!("  Low stock: {} products", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one sample catalog entry with price variation by index.
fn sample_product(
    category: &str,
    brand: &str,
    model: &str,
    color: &str,
    index: usize,
) -> NewProduct {
    // Spread prices across a plausible range per index
    let cost_cny_fen = 200_000 + (index as i64 % 20) * 150_000; // ¥2,000 - ¥30,500
    let sale_price_krw = 500_000 + (index as i64 % 20) * 350_000; // ₩500k - ₩7.15M

    NewProduct {
        category: category.to_string(),
        model: model.to_string(),
        color: color.to_string(),
        brand: brand.to_string(),
        cost_cny_fen,
        sale_price_krw,
        low_stock_threshold: 3,
    }
}
