//! Seed the catalog with demo products.

use warung_core::{Price, Stock};
use warung_server::db::products::{ProductFields, ProductRepository};

use super::open_pool;

const DEMO_PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("Kopi Gayo 250g", "Arabica single origin dari Aceh", 55000, 20),
    ("Teh Melati 100g", "Teh hijau melati seduh daun", 20000, 35),
    ("Gula Aren 500g", "Gula aren cetak tradisional", 18000, 50),
    ("Keripik Singkong", "Keripik singkong pedas manis", 12000, 80),
    ("Madu Hutan 350ml", "Madu hutan murni tanpa campuran", 75000, 12),
];

/// Insert demo products into an empty catalog.
///
/// Does nothing when products already exist, so running it twice never
/// duplicates rows.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = open_pool().await?;
    warung_server::db::run_migrations(&pool).await?;

    let repo = ProductRepository::new(&pool);
    if !repo.list().await?.is_empty() {
        println!("Catalog is not empty, skipping seed");
        return Ok(());
    }

    for (name, description, price, stock) in DEMO_PRODUCTS {
        let fields = ProductFields {
            name: (*name).to_string(),
            description: (*description).to_string(),
            price: Price::new(*price)?,
            stock: Stock::new(*stock)?,
        };
        let product = repo.create(&fields, None).await?;
        tracing::info!(product_id = %product.id, name, "seeded product");
    }

    println!("Seeded {} products", DEMO_PRODUCTS.len());
    Ok(())
}
