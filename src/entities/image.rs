//! Image entity - Binary store for article images.
//!
//! The relational backend keeps image bytes in this table; the row id,
//! rendered as a string, is the reference stored on the article.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Image database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "images")]
pub struct Model {
    /// Unique identifier, doubles as the image reference
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Original file name, kept for display
    pub name: String,
    /// Raw image bytes
    pub data: Vec<u8>,
}

/// Images have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
