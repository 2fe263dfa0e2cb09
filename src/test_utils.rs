//! Shared test utilities for `ShopTally`.
//!
//! This module provides common helper functions for setting up test stores
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        article::{self, ArticleInput},
        sale::{self, PaymentMethod, SaleInput},
    },
    entities,
    errors::Result,
    store::{DatabaseStore, NewArticle, Store},
};

/// Creates a [`DatabaseStore`] over an in-memory `SQLite` database with all
/// tables initialized. This is the standard setup for integration tests.
pub async fn setup_database_store() -> Result<DatabaseStore> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(DatabaseStore::new(db))
}

/// Builds an article insert record with sensible defaults, for store-level
/// tests that bypass the business-logic validation.
#[must_use]
pub fn new_test_article(name: &str, price: f64, stock: i64) -> NewArticle {
    NewArticle {
        name: name.to_string(),
        category: None,
        image: None,
        price,
        stock,
        initial_stock: stock,
        initial_price: price,
        created_at: chrono::Utc::now(),
    }
}

/// Builds an [`ArticleInput`] without category or image.
#[must_use]
pub fn article_input(name: &str, price: f64, stock: i64) -> ArticleInput {
    ArticleInput {
        name: name.to_string(),
        category: None,
        price,
        stock,
        image: None,
    }
}

/// Builds a cash [`SaleInput`] with nothing paid yet.
///
/// # Defaults
/// * `buyer`: `"Test Buyer"`
/// * `payment_method`: [`PaymentMethod::Cash`]
/// * `amount_paid`: 0.0
#[must_use]
pub fn cash_sale_input(article_id: i64, quantity: i64) -> SaleInput {
    SaleInput {
        article_id,
        quantity,
        buyer: "Test Buyer".to_string(),
        payment_method: PaymentMethod::Cash,
        bank_name: None,
        amount_paid: 0.0,
    }
}

/// Registers a test article through the business logic.
pub async fn create_test_article(
    store: &dyn Store,
    name: &str,
    price: f64,
    stock: i64,
) -> Result<entities::article::Model> {
    article::create_article(store, article_input(name, price, stock)).await
}

/// Records a cash test sale through the business logic.
pub async fn create_test_sale(
    store: &dyn Store,
    article_id: i64,
    quantity: i64,
) -> Result<entities::sale::Model> {
    sale::create_sale(store, cash_sale_input(article_id, quantity)).await
}

/// Sets up a database store with one article: "Sugar", price 5.0, stock 10.
/// Returns (store, article) for common sale-lifecycle scenarios.
pub async fn setup_with_article() -> Result<(DatabaseStore, entities::article::Model)> {
    let store = setup_database_store().await?;
    let article = create_test_article(&store, "Sugar", 5.0, 10).await?;
    Ok((store, article))
}
