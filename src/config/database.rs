//! Database configuration module for the relational backend.
//!
//! This module handles the `SQLite` database connection and table creation
//! using `SeaORM`. Tables are generated from the entity definitions through
//! `Schema::create_table_from_entity`, so the database schema always matches
//! the Rust struct definitions without manual SQL.

use crate::entities::{Article, Image, Sale, Setting, User};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/shoptally.sqlite?mode=rwc";

/// Resolves the connection URL: explicit override first, then the
/// `DATABASE_URL` environment variable, then the default local `SQLite` file.
#[must_use]
pub fn get_database_url(url_override: Option<&str>) -> String {
    url_override.map_or_else(
        || std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
        ToString::to_string,
    )
}

/// Establishes a connection to the database.
///
/// `url_override` comes from the application configuration; see
/// [`get_database_url`] for the fallback chain.
pub async fn create_connection(url_override: Option<&str>) -> Result<DatabaseConnection> {
    let database_url = get_database_url(url_override);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all missing tables from the entity definitions.
///
/// Safe to run on every startup; existing tables are left alone.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut article_table = schema.create_table_from_entity(Article);
    let mut sale_table = schema.create_table_from_entity(Sale);
    let mut user_table = schema.create_table_from_entity(User);
    let mut setting_table = schema.create_table_from_entity(Setting);
    let mut image_table = schema.create_table_from_entity(Image);

    db.execute(builder.build(article_table.if_not_exists()))
        .await?;
    db.execute(builder.build(sale_table.if_not_exists())).await?;
    db.execute(builder.build(user_table.if_not_exists())).await?;
    db.execute(builder.build(setting_table.if_not_exists()))
        .await?;
    db.execute(builder.build(image_table.if_not_exists())).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        article::Model as ArticleModel, sale::Model as SaleModel,
        setting::Model as SettingModel, user::Model as UserModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ArticleModel> = Article::find().limit(1).all(&db).await?;
        let _: Vec<SaleModel> = Sale::find().limit(1).all(&db).await?;
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<SettingModel> = Setting::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_twice_is_safe() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<ArticleModel> = Article::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[test]
    fn test_get_database_url_prefers_override() {
        let url = get_database_url(Some("sqlite://elsewhere.sqlite"));
        assert_eq!(url, "sqlite://elsewhere.sqlite");
    }
}
