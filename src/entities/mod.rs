//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod article;
pub mod image;
pub mod sale;
pub mod setting;
pub mod user;

// Re-export specific types to avoid conflicts
pub use article::{Column as ArticleColumn, Entity as Article, Model as ArticleModel};
pub use image::{Column as ImageColumn, Entity as Image, Model as ImageModel};
pub use sale::{Column as SaleColumn, Entity as Sale, Model as SaleModel};
pub use setting::{Column as SettingColumn, Entity as Setting, Model as SettingModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
