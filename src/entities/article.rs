//! Article entity - Represents a sellable inventory item.
//!
//! Each article carries its current price and stock count alongside the
//! values it was registered with (`initial_price`, `initial_stock`), an
//! optional category and an optional image reference. Stock is only mutated
//! through the sale lifecycle operations and never drops below zero.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Article database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    /// Unique identifier for the article
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name of the article (e.g., "Rice 25kg")
    pub name: String,
    /// Optional category the article is filed under
    pub category: Option<String>,
    /// Optional reference into the image store
    pub image: Option<String>,
    /// Current unit price
    pub price: f64,
    /// Units currently available for sale, never negative
    pub stock: i64,
    /// Stock count the article was registered with
    pub initial_stock: i64,
    /// Unit price the article was registered with
    pub initial_price: f64,
    /// When the article was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Article and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One article has many sales
    #[sea_orm(has_many = "super::sale::Entity")]
    Sales,
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
