//! # Seed Data Generator
//!
//! Populates the database with the shop's reference data: measurement
//! units, cuts, categories and the starting product catalog.
//!
//! ## Usage
//! ```bash
//! # Default database path (./data/tajo.db)
//! cargo run -p tajo-db --bin seed
//!
//! # Specify database path
//! cargo run -p tajo-db --bin seed -- --db ./data/tajo.db
//! ```
//!
//! Safe to run twice: existing reference rows are reused, and products
//! are only created into an empty catalog.

use std::collections::HashMap;
use std::env;

use rust_decimal::Decimal;
use tajo_core::{CategoryRef, CutPriceInput, NewCategory, NewCut, NewProduct, NewUnit};
use tajo_db::{Database, DbConfig, DbError};

/// Cuts offered at the counter: (name, description).
const CUTS: &[(&str, &str)] = &[
    ("Por Mitad", "Dividido por la mitad"),
    ("En Cuatro", "Dividido en cuatro partes"),
    ("Rodajas", "Cortado en rodajas delgadas"),
    ("Cruz", "Corte transversal"),
    ("Sacada", "Tripa sacada"),
    ("Sin Tapa", "Corte de cabeza sin tapa"),
];

/// Categories: (name, description).
const CATEGORIES: &[(&str, &str)] = &[
    ("Cajas de Menudo", "Productos de menudencia"),
    ("Viscera Blanca", "Vísceras blancas del animal"),
    ("Viscera Roja", "Vísceras rojas del animal"),
];

/// Starting catalog: (name, description, price_per_kg, category).
const PRODUCTS: &[(&str, &str, u32, &str)] = &[
    ("Menudo National", "Caja de menudo National", 60, "Cajas de Menudo"),
    ("Menudo Excel", "Caja de menudo Excel", 62, "Cajas de Menudo"),
    ("Menudo Washington", "Caja de menudo Washington", 65, "Cajas de Menudo"),
    ("Menudo Canadian", "Caja de menudo Canadian", 65, "Cajas de Menudo"),
    ("Panza", "Panza", 50, "Viscera Blanca"),
    ("Libro", "Libro", 52, "Viscera Blanca"),
    ("Pata Morena", "Pata morena", 45, "Viscera Blanca"),
    ("Corazon", "Corazón de res", 55, "Viscera Roja"),
    ("Sesos", "Sesos de res", 70, "Viscera Roja"),
    ("Tripa", "Tripa de res", 40, "Viscera Roja"),
];

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("seed failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), DbError> {
    let db_path = parse_db_path();

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        }
    }

    println!("Seeding {db_path}");
    let db = Database::new(DbConfig::new(&db_path)).await?;

    // Units: everything is sold by weight or by count
    let kg = ensure_unit(&db, "Kilogramo", "kg").await?;
    ensure_unit(&db, "Pieza", "pz").await?;

    let mut cut_ids = HashMap::new();
    for (name, description) in CUTS {
        let id = ensure_cut(&db, name, description).await?;
        cut_ids.insert(*name, id);
    }

    let mut category_ids = HashMap::new();
    for (name, description) in CATEGORIES {
        let id = ensure_category(&db, name, description).await?;
        category_ids.insert(*name, id);
    }

    if db.products().count().await? > 0 {
        println!("Catalog already has products, leaving it alone");
        return Ok(());
    }

    for (name, description, price, category) in PRODUCTS {
        let base = Decimal::from(*price);
        let menudo_box = *category == "Cajas de Menudo";

        // Menudo boxes sell halved at the base price and quartered for a
        // little more; loose viscera goes out as-is
        let cuts = if menudo_box {
            Some(vec![
                CutPriceInput {
                    cut_id: cut_ids["Por Mitad"].clone(),
                    price_per_kg: Some(base),
                    price_per_unit: None,
                },
                CutPriceInput {
                    cut_id: cut_ids["En Cuatro"].clone(),
                    price_per_kg: Some(base + Decimal::from(2)),
                    price_per_unit: None,
                },
            ])
        } else {
            None
        };

        db.products()
            .create(&NewProduct {
                name: (*name).to_string(),
                description: Some((*description).to_string()),
                price_per_kg: Some(base),
                base_unit_id: kg.clone(),
                categories: Some(vec![CategoryRef {
                    category_id: category_ids[category].clone(),
                }]),
                cuts,
                ..NewProduct::default()
            })
            .await?;
        println!("  + {name} (${price}/kg)");
    }

    let count = db.products().count().await?;
    println!("Done: {count} products in the catalog");
    Ok(())
}

fn parse_db_path() -> String {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| "./data/tajo.db".to_string())
}

async fn ensure_unit(db: &Database, name: &str, abbreviation: &str) -> Result<String, DbError> {
    match db
        .catalog()
        .create_unit(&NewUnit {
            name: name.to_string(),
            abbreviation: abbreviation.to_string(),
            conversion_factor: None,
        })
        .await
    {
        Ok(unit) => Ok(unit.id),
        Err(DbError::UniqueViolation { .. }) => lookup(
            db.catalog()
                .list_units()
                .await?
                .into_iter()
                .map(|u| (u.name, u.id)),
            name,
        ),
        Err(e) => Err(e),
    }
}

async fn ensure_cut(db: &Database, name: &str, description: &str) -> Result<String, DbError> {
    match db
        .catalog()
        .create_cut(&NewCut {
            name: name.to_string(),
            description: Some(description.to_string()),
        })
        .await
    {
        Ok(cut) => Ok(cut.id),
        Err(DbError::UniqueViolation { .. }) => lookup(
            db.catalog()
                .list_cuts()
                .await?
                .into_iter()
                .map(|c| (c.name, c.id)),
            name,
        ),
        Err(e) => Err(e),
    }
}

async fn ensure_category(db: &Database, name: &str, description: &str) -> Result<String, DbError> {
    match db
        .catalog()
        .create_category(&NewCategory {
            name: name.to_string(),
            description: Some(description.to_string()),
        })
        .await
    {
        Ok(category) => Ok(category.id),
        Err(DbError::UniqueViolation { .. }) => lookup(
            db.catalog()
                .list_categories()
                .await?
                .into_iter()
                .map(|c| (c.name, c.id)),
            name,
        ),
        Err(e) => Err(e),
    }
}

fn lookup(pairs: impl Iterator<Item = (String, String)>, name: &str) -> Result<String, DbError> {
    pairs
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, id)| id)
        .ok_or_else(|| DbError::not_found("reference row", name))
}
