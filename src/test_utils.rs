//! Shared test utilities.
//!
//! Helpers for an in-memory favorites database, sample products and a scripted
//! product catalog.

use crate::{
    core::{catalog::ProductCatalog, favorites::FavoriteSnapshot},
    errors::{CatalogError, Result},
    models::Product,
};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A product with sensible defaults.
///
/// # Defaults
/// * `brand`: "nyx"
/// * `price`: "10.0"
/// * `image_link`: `https://example.com/<id>.png`
pub fn test_product(id: i64, name: &str) -> Product {
    Product {
        id,
        brand: Some("nyx".to_string()),
        name: name.to_string(),
        price: Some("10.0".to_string()),
        image_link: Some(format!("https://example.com/{id}.png")),
        description: None,
        product_type: None,
        rating: Some(4.0),
    }
}

/// Favorite snapshot of a product.
pub fn snapshot_of(product: &Product) -> FavoriteSnapshot {
    FavoriteSnapshot::from(product)
}

type Scripted = (Duration, std::result::Result<Vec<Product>, CatalogError>);

/// Catalog that records lookups and answers from a script.
///
/// Terms without a scripted answer return one product named after the term.
#[derive(Default)]
pub struct FakeCatalog {
    calls: Mutex<Vec<(String, bool)>>,
    script: Mutex<HashMap<String, Scripted>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `term` with `result` after `delay`.
    pub fn respond(
        &self,
        term: &str,
        delay: Duration,
        result: std::result::Result<Vec<Product>, CatalogError>,
    ) {
        self.script
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(term.to_string(), (delay, result));
    }

    /// Lookups made so far as `(term, by_category)`.
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ProductCatalog for FakeCatalog {
    async fn fetch(
        &self,
        term: &str,
        by_category: bool,
    ) -> std::result::Result<Vec<Product>, CatalogError> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((term.to_string(), by_category));

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(term)
            .cloned();

        match scripted {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Ok(vec![test_product(1, term)]),
        }
    }
}
