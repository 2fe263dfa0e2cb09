//! Sale entity - Represents one recorded transaction against an article.
//!
//! The article's name and unit price are denormalized onto the sale at the
//! moment it is recorded, so the history stays readable even after the
//! article changes. `payment_method` is one of `"cash"`, `"transfer"` or
//! `"no-payment"`; `bank_name` is only present for transfers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sale database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    /// Unique identifier for the sale
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the article this sale was recorded against
    pub article_id: i64,
    /// Article name captured at sale time
    pub article_name: String,
    /// Article unit price captured at sale time
    pub unit_price: f64,
    /// Units sold, always positive
    pub quantity: i64,
    /// Unit price times quantity at sale time
    pub total_price: f64,
    /// Name of the buyer
    pub buyer: String,
    /// Payment method: `"cash"`, `"transfer"` or `"no-payment"`
    pub payment_method: String,
    /// Bank the transfer went through, only set for `"transfer"`
    pub bank_name: Option<String>,
    /// Amount the buyer has paid so far, between 0 and `total_price`
    pub amount_paid: f64,
    /// When the sale was recorded
    pub sold_at: DateTimeUtc,
}

/// Defines relationships between Sale and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each sale belongs to one article
    #[sea_orm(
        belongs_to = "super::article::Entity",
        from = "Column::ArticleId",
        to = "super::article::Column::Id"
    )]
    Article,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
