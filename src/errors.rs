//! Unified error types for `ShopTally`.
//!
//! Every error carries a message suitable for direct display in a UI
//! notification; none of them are fatal to the process.

use thiserror::Error;

/// All errors the crate can surface, split into not-found, validation and
/// backend categories.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration problem (missing file, bad field, empty name, ...)
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what is wrong
        message: String,
    },

    /// Referenced article does not exist
    #[error("article not found: {id}")]
    ArticleNotFound {
        /// Identifier the lookup was performed with
        id: String,
    },

    /// Referenced sale does not exist
    #[error("sale not found: {id}")]
    SaleNotFound {
        /// Identifier the lookup was performed with
        id: String,
    },

    /// Referenced user account does not exist
    #[error("user not found: {name}")]
    UserNotFound {
        /// Name or identifier the lookup was performed with
        name: String,
    },

    /// A user account with this name already exists
    #[error("a user named '{name}' already exists")]
    DuplicateUser {
        /// The conflicting account name
        name: String,
    },

    /// The requested quantity cannot be served from the article's stock
    #[error("insufficient stock: {requested} requested, {available} available")]
    InsufficientStock {
        /// Units currently available
        available: i64,
        /// Units the operation asked for
        requested: i64,
    },

    /// Sale quantity must be a positive integer
    #[error("invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i64,
    },

    /// Monetary amount is negative, NaN or infinite
    #[error("invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Amount paid is larger than the sale's total price
    #[error("amount exceeds total: {paid} paid, {total} due")]
    AmountExceedsTotal {
        /// Amount the buyer paid
        paid: f64,
        /// Total price of the sale
        total: f64,
    },

    /// Payment method `transfer` requires a bank name
    #[error("a bank name is required for transfer payments")]
    MissingBankName,

    /// Unrecognized payment method string
    #[error("invalid payment method: {value}")]
    InvalidPaymentMethod {
        /// The rejected input
        value: String,
    },

    /// The article is still referenced by at least one sale
    #[error("cannot delete an article that has associated sales")]
    ArticleHasSales {
        /// Identifier of the guarded article
        id: i64,
    },

    /// Database backend failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Local storage backend failure
    #[error("Local storage error: {message}")]
    Storage {
        /// Description of the underlying failure
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
