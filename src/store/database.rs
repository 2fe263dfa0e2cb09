//! Relational [`Store`] backend built on SeaORM.
//!
//! This is the standalone stand-in for the remote relational store: three
//! record tables, a key-value settings table and a blob table for images.
//! Stock adjustments are issued as a single relative column update
//! (`stock = stock + delta`) rather than read-modify-write.

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, QueryOrder, Set, prelude::*, sea_query::Expr};

use super::{NewArticle, NewSale, NewUser, Store};
use crate::{
    entities::{Article, Image, Sale, Setting, User, article, image, sale, setting, user},
    errors::{Error, Result},
};

/// [`Store`] implementation over a SeaORM database connection.
#[derive(Debug, Clone)]
pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    /// Wraps an established connection. Table creation is the caller's job,
    /// see [`crate::config::database::create_tables`].
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn parse_image_reference(reference: &str) -> Result<i64> {
        reference.parse().map_err(|_| Error::Config {
            message: format!("invalid image reference: {reference}"),
        })
    }
}

#[async_trait]
impl Store for DatabaseStore {
    async fn list_articles(&self) -> Result<Vec<article::Model>> {
        Article::find()
            .order_by_asc(article::Column::Name)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn find_article(&self, id: i64) -> Result<Option<article::Model>> {
        Article::find_by_id(id).one(&self.db).await.map_err(Into::into)
    }

    async fn insert_article(&self, new: NewArticle) -> Result<article::Model> {
        let article = article::ActiveModel {
            name: Set(new.name),
            category: Set(new.category),
            image: Set(new.image),
            price: Set(new.price),
            stock: Set(new.stock),
            initial_stock: Set(new.initial_stock),
            initial_price: Set(new.initial_price),
            created_at: Set(new.created_at),
            ..Default::default()
        };
        article.insert(&self.db).await.map_err(Into::into)
    }

    async fn update_article(&self, article: article::Model) -> Result<article::Model> {
        let update = article::ActiveModel {
            id: Set(article.id),
            name: Set(article.name),
            category: Set(article.category),
            image: Set(article.image),
            price: Set(article.price),
            stock: Set(article.stock),
            initial_stock: Set(article.initial_stock),
            initial_price: Set(article.initial_price),
            created_at: Set(article.created_at),
        };
        update.update(&self.db).await.map_err(Into::into)
    }

    async fn adjust_article_stock(&self, id: i64, delta: i64) -> Result<article::Model> {
        // First verify the article exists
        let _article = Article::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::ArticleNotFound { id: id.to_string() })?;

        // Relative update: stock = stock + delta
        Article::update_many()
            .col_expr(
                article::Column::Stock,
                Expr::col(article::Column::Stock).add(delta),
            )
            .filter(article::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        // Return the updated article
        Article::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::ArticleNotFound { id: id.to_string() })
    }

    async fn delete_article(&self, id: i64) -> Result<()> {
        Article::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn article_has_sales(&self, article_id: i64) -> Result<bool> {
        let first = Sale::find()
            .filter(sale::Column::ArticleId.eq(article_id))
            .one(&self.db)
            .await?;
        Ok(first.is_some())
    }

    async fn list_sales(&self) -> Result<Vec<sale::Model>> {
        Sale::find()
            .order_by_desc(sale::Column::SoldAt)
            .order_by_desc(sale::Column::Id)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn find_sale(&self, id: i64) -> Result<Option<sale::Model>> {
        Sale::find_by_id(id).one(&self.db).await.map_err(Into::into)
    }

    async fn sales_for_article(&self, article_id: i64) -> Result<Vec<sale::Model>> {
        Sale::find()
            .filter(sale::Column::ArticleId.eq(article_id))
            .order_by_desc(sale::Column::SoldAt)
            .order_by_desc(sale::Column::Id)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn insert_sale(&self, new: NewSale) -> Result<sale::Model> {
        let sale = sale::ActiveModel {
            article_id: Set(new.article_id),
            article_name: Set(new.article_name),
            unit_price: Set(new.unit_price),
            quantity: Set(new.quantity),
            total_price: Set(new.total_price),
            buyer: Set(new.buyer),
            payment_method: Set(new.payment_method),
            bank_name: Set(new.bank_name),
            amount_paid: Set(new.amount_paid),
            sold_at: Set(new.sold_at),
            ..Default::default()
        };
        sale.insert(&self.db).await.map_err(Into::into)
    }

    async fn update_sale(&self, sale: sale::Model) -> Result<sale::Model> {
        let update = sale::ActiveModel {
            id: Set(sale.id),
            article_id: Set(sale.article_id),
            article_name: Set(sale.article_name),
            unit_price: Set(sale.unit_price),
            quantity: Set(sale.quantity),
            total_price: Set(sale.total_price),
            buyer: Set(sale.buyer),
            payment_method: Set(sale.payment_method),
            bank_name: Set(sale.bank_name),
            amount_paid: Set(sale.amount_paid),
            sold_at: Set(sale.sold_at),
        };
        update.update(&self.db).await.map_err(Into::into)
    }

    async fn delete_sale(&self, id: i64) -> Result<()> {
        Sale::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<user::Model>> {
        User::find()
            .order_by_asc(user::Column::Name)
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<user::Model>> {
        User::find()
            .filter(user::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn insert_user(&self, new: NewUser) -> Result<user::Model> {
        let user = user::ActiveModel {
            name: Set(new.name),
            pin: Set(new.pin),
            created_at: Set(new.created_at),
            ..Default::default()
        };
        user.insert(&self.db).await.map_err(Into::into)
    }

    async fn delete_user(&self, id: i64) -> Result<()> {
        User::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let row = Setting::find()
            .filter(setting::Column::Key.eq(key))
            .one(&self.db)
            .await?;
        Ok(row.map(|r| r.value))
    }

    async fn put_setting(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now();
        match Setting::find()
            .filter(setting::Column::Key.eq(key))
            .one(&self.db)
            .await?
        {
            Some(existing) => {
                let mut row: setting::ActiveModel = existing.into();
                row.value = Set(value.to_string());
                row.updated_at = Set(now);
                row.update(&self.db).await?;
            }
            None => {
                let row = setting::ActiveModel {
                    key: Set(key.to_string()),
                    value: Set(value.to_string()),
                    updated_at: Set(now),
                    ..Default::default()
                };
                row.insert(&self.db).await?;
            }
        }
        Ok(())
    }

    async fn store_image(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let row = image::ActiveModel {
            name: Set(name.to_string()),
            data: Set(bytes.to_vec()),
            ..Default::default()
        };
        let stored = row.insert(&self.db).await?;
        Ok(stored.id.to_string())
    }

    async fn load_image(&self, reference: &str) -> Result<Option<Vec<u8>>> {
        let id = Self::parse_image_reference(reference)?;
        let row = Image::find_by_id(id).one(&self.db).await?;
        Ok(row.map(|r| r.data))
    }

    async fn delete_image(&self, reference: &str) -> Result<()> {
        let id = Self::parse_image_reference(reference)?;
        Image::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
