//! Storage abstraction for `ShopTally`.
//!
//! All business logic talks to the [`Store`] trait, never to a concrete
//! backend, so the stock arithmetic exists exactly once. Two implementations
//! are provided and selected at startup from the application configuration:
//!
//! - [`DatabaseStore`] - SeaORM over a relational database, the standalone
//!   stand-in for the remote store
//! - [`LocalStore`] - a synchronous key-value state persisted to a JSON file,
//!   the offline fallback
//!
//! Multi-record operations are sequences of independent store calls; the
//! trait offers no transactions. Callers that need consistency perform
//! best-effort compensating writes on partial failure.

/// Relational backend built on SeaORM
pub mod database;
/// Local JSON-file backend
pub mod local;

pub use database::DatabaseStore;
pub use local::LocalStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    config::app::{AppConfig, StorageBackend},
    entities::{article, sale, user},
    errors::Result,
};

/// Field set for inserting an article; the backend assigns the id.
#[derive(Debug, Clone)]
pub struct NewArticle {
    /// Article name
    pub name: String,
    /// Optional category
    pub category: Option<String>,
    /// Optional image reference, already stored
    pub image: Option<String>,
    /// Current unit price
    pub price: f64,
    /// Current stock count
    pub stock: i64,
    /// Stock captured at registration
    pub initial_stock: i64,
    /// Price captured at registration
    pub initial_price: f64,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

/// Field set for inserting a sale; the backend assigns the id.
#[derive(Debug, Clone)]
pub struct NewSale {
    /// Referenced article
    pub article_id: i64,
    /// Article name denormalized at sale time
    pub article_name: String,
    /// Article unit price denormalized at sale time
    pub unit_price: f64,
    /// Units sold
    pub quantity: i64,
    /// Unit price times quantity
    pub total_price: f64,
    /// Buyer name
    pub buyer: String,
    /// Payment method string (`"cash"`, `"transfer"`, `"no-payment"`)
    pub payment_method: String,
    /// Bank name for transfers
    pub bank_name: Option<String>,
    /// Amount paid so far
    pub amount_paid: f64,
    /// Sale timestamp
    pub sold_at: DateTime<Utc>,
}

/// Field set for inserting a user account; the backend assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Account name
    pub name: String,
    /// Clear-text PIN
    pub pin: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// CRUD surface the business logic needs from a persistence backend.
///
/// Implementations must keep the three record collections (articles, sales,
/// users), a key-value settings map and a binary image store. They are not
/// expected to validate business rules; resulting-stock checks, payment
/// normalization and referential guards all live in [`crate::core`].
#[async_trait]
pub trait Store: Send + Sync {
    // --- articles ---

    /// All articles, ordered alphabetically by name.
    async fn list_articles(&self) -> Result<Vec<article::Model>>;

    /// Look up one article by id.
    async fn find_article(&self, id: i64) -> Result<Option<article::Model>>;

    /// Insert an article and return it with its assigned id.
    async fn insert_article(&self, new: NewArticle) -> Result<article::Model>;

    /// Overwrite an article row, matched by id.
    async fn update_article(&self, article: article::Model) -> Result<article::Model>;

    /// Add `delta` to an article's stock count and return the updated row.
    ///
    /// The adjustment is applied as a single relative update so that the read
    /// feeding a validation check and the write cannot interleave with each
    /// other inside one operation.
    async fn adjust_article_stock(&self, id: i64, delta: i64) -> Result<article::Model>;

    /// Remove an article row.
    async fn delete_article(&self, id: i64) -> Result<()>;

    /// Whether at least one sale references the article.
    async fn article_has_sales(&self, article_id: i64) -> Result<bool>;

    // --- sales ---

    /// All sales, newest first.
    async fn list_sales(&self) -> Result<Vec<sale::Model>>;

    /// Look up one sale by id.
    async fn find_sale(&self, id: i64) -> Result<Option<sale::Model>>;

    /// All sales recorded against one article, newest first.
    async fn sales_for_article(&self, article_id: i64) -> Result<Vec<sale::Model>>;

    /// Insert a sale and return it with its assigned id.
    async fn insert_sale(&self, new: NewSale) -> Result<sale::Model>;

    /// Overwrite a sale row, matched by id.
    async fn update_sale(&self, sale: sale::Model) -> Result<sale::Model>;

    /// Remove a sale row.
    async fn delete_sale(&self, id: i64) -> Result<()>;

    // --- users ---

    /// All user accounts, ordered alphabetically by name.
    async fn list_users(&self) -> Result<Vec<user::Model>>;

    /// Look up one account by name.
    async fn find_user_by_name(&self, name: &str) -> Result<Option<user::Model>>;

    /// Insert an account and return it with its assigned id.
    async fn insert_user(&self, new: NewUser) -> Result<user::Model>;

    /// Remove an account row.
    async fn delete_user(&self, id: i64) -> Result<()>;

    // --- settings ---

    /// Read one configuration value.
    async fn get_setting(&self, key: &str) -> Result<Option<String>>;

    /// Write one configuration value, inserting or overwriting.
    async fn put_setting(&self, key: &str, value: &str) -> Result<()>;

    // --- images ---

    /// Store image bytes and return the reference to put on an article.
    async fn store_image(&self, name: &str, bytes: &[u8]) -> Result<String>;

    /// Read image bytes back by reference.
    async fn load_image(&self, reference: &str) -> Result<Option<Vec<u8>>>;

    /// Remove a stored image.
    async fn delete_image(&self, reference: &str) -> Result<()>;
}

/// Opens the storage backend named by the configuration.
///
/// `database` connects via SeaORM and creates missing tables; `local` loads
/// (or starts) the JSON file at the configured path.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>> {
    match config.storage.backend {
        StorageBackend::Database => {
            let db = crate::config::database::create_connection(
                config.storage.database_url.as_deref(),
            )
            .await?;
            crate::config::database::create_tables(&db).await?;
            Ok(Arc::new(DatabaseStore::new(db)))
        }
        StorageBackend::Local => Ok(Arc::new(LocalStore::open(&config.storage.local_path)?)),
    }
}
