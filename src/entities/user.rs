//! User entity - Represents a sub-business account.
//!
//! Accounts are identified by name and guarded by a numeric PIN. The PIN is
//! stored and compared in clear text, exactly as the session-level check
//! expects it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Account name, unique across the store
    pub name: String,
    /// Numeric PIN, stored in clear text
    pub pin: String,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Users have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
