//! # Seed Data Generator
//!
//! Populates the database with a demo catalog, a few customers and a
//! handful of settled orders for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default dev database
//! cargo run -p tally-db --bin seed
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```
//!
//! Orders are settled through the real engine, so the seeded database
//! has consistent stock levels and a matching ledger.

use std::env;

use chrono::Utc;
use uuid::Uuid;

use tally_core::{Customer, DraftLine, DraftOrder, PaymentType, Product, TaxRate};
use tally_db::repository::customer::generate_customer_id;
use tally_db::{Database, DbConfig};

/// Demo catalog: (sku, name, category, price_cents, cost_cents, stock).
const CATALOG: &[(&str, &str, &str, i64, i64, i64)] = &[
    ("BEV-001", "Coca-Cola 330ml", "Beverages", 150, 90, 120),
    ("BEV-002", "Pepsi 330ml", "Beverages", 145, 85, 96),
    ("BEV-003", "Orange Juice 1L", "Beverages", 399, 250, 40),
    ("BEV-004", "Still Water 500ml", "Beverages", 99, 40, 200),
    ("SNK-001", "Lays Classic 150g", "Snacks", 250, 150, 80),
    ("SNK-002", "Doritos Nacho 150g", "Snacks", 265, 160, 64),
    ("SNK-003", "Snickers Bar", "Snacks", 120, 70, 150),
    ("DRY-001", "Whole Milk 1L", "Dairy", 189, 120, 60),
    ("DRY-002", "Cheddar Cheese 200g", "Dairy", 449, 300, 30),
    ("GRO-001", "White Bread Loaf", "Grocery", 220, 130, 45),
    ("GRO-002", "Spaghetti 500g", "Grocery", 179, 95, 70),
    ("GRO-003", "Basmati Rice 1kg", "Grocery", 550, 380, 55),
];

/// Demo customers: (name, phone).
const CUSTOMERS: &[(&str, &str)] = &[
    ("Ali Raza", "+92-300-1234567"),
    ("Sara Khan", "+92-321-7654321"),
    ("Bilal Ahmed", "+92-333-1112223"),
];

/// Demo orders settle at 18% GST.
const DEMO_TAX_BPS: u32 = 1800;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./tally_dev.db");

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
                println!("Tally POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tally POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding catalog...");

    let now = Utc::now();
    let mut product_ids = Vec::with_capacity(CATALOG.len());

    for (sku, name, category, price_cents, cost_cents, stock) in CATALOG {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: Some(sku.to_string()),
            barcode: None,
            name: name.to_string(),
            category: category.to_string(),
            price_cents: *price_cents,
            cost_cents: *cost_cents,
            stock: *stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await?;
        product_ids.push(product.id);
    }
    println!("✓ Seeded {} products", CATALOG.len());

    let mut customer_ids = Vec::with_capacity(CUSTOMERS.len());
    for (name, phone) in CUSTOMERS {
        let customer = Customer {
            id: generate_customer_id(),
            name: name.to_string(),
            phone: Some(phone.to_string()),
            email: None,
            address: None,
            created_at: now,
            updated_at: now,
        };
        db.customers().insert(&customer).await?;
        customer_ids.push(customer.id);
    }
    println!("✓ Seeded {} customers", CUSTOMERS.len());

    println!();
    println!("Settling demo orders...");

    let engine = db.settlement();
    let tax_rate = TaxRate::from_bps(DEMO_TAX_BPS);

    // A few representative sales: one walk-in, one named customer and
    // one mixed cart with a manual line.
    let carts: Vec<(Option<usize>, Vec<(usize, i64)>, Vec<(&str, i64)>)> = vec![
        (None, vec![(0, 2), (4, 1)], vec![]),
        (Some(0), vec![(7, 1), (9, 2), (2, 1)], vec![]),
        (Some(1), vec![(11, 1)], vec![("Carrier Bag", 15)]),
    ];

    for (customer_idx, catalog_lines, manual_lines) in carts {
        let mut lines: Vec<DraftLine> = catalog_lines
            .iter()
            .map(|(product_idx, qty)| {
                let (_, name, _, price, _, _) = CATALOG[*product_idx];
                DraftLine {
                    product_id: Some(product_ids[*product_idx].clone()),
                    name: name.to_string(),
                    quantity: *qty,
                    unit_price_cents: price,
                }
            })
            .collect();
        for (name, price) in manual_lines {
            lines.push(DraftLine {
                product_id: None,
                name: name.to_string(),
                quantity: 1,
                unit_price_cents: price,
            });
        }

        let mut draft = DraftOrder::new(PaymentType::Cash, tax_rate, lines);
        draft.customer_id = customer_idx.map(|idx| customer_ids[idx].clone());

        let placed = engine.place_order(&draft).await?;
        println!(
            "  {} settled for {} cents",
            placed.invoice_no, placed.total_cents
        );
    }

    // One adjustment so the ledger shows an audit entry.
    let new_stock = engine
        .adjust_inventory(&product_ids[5], -2, "damaged in transit")
        .await?;
    println!("  Adjusted {} to stock {}", CATALOG[5].1, new_stock);

    let report = db.ledger().query(None, None).await?;
    println!();
    println!("Ledger summary:");
    println!("  SALE  {:>8} cents", report.totals.sale_cents);
    println!("  TAX   {:>8} cents", report.totals.tax_cents);
    println!("  COGS  {:>8} cents", report.totals.cogs_cents);
    println!("  Entries: {}", report.entries.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
