//! Article business logic - Handles all article-related operations.
//!
//! This module provides functions for registering, retrieving, updating and
//! deleting articles. Deletion is guarded: an article that still has sales
//! recorded against it cannot be removed, which keeps the denormalized
//! article name and price on the sales history resolvable. Stock is never
//! mutated here outside of an explicit owner correction; the sale lifecycle
//! in [`crate::core::sale`] owns all sale-driven stock movement.

use tracing::warn;

use crate::{
    entities::article,
    errors::{Error, Result},
    store::{NewArticle, Store},
};

/// An image to attach to an article, as raw upload bytes.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Original file name
    pub name: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

/// Validated form input for registering or updating an article.
#[derive(Debug, Clone)]
pub struct ArticleInput {
    /// Article name, must be non-empty
    pub name: String,
    /// Optional category
    pub category: Option<String>,
    /// Unit price, must be finite and non-negative
    pub price: f64,
    /// Stock count, must be non-negative
    pub stock: i64,
    /// Optional image to store alongside the article
    pub image: Option<ImageUpload>,
}

fn validate_input(input: &ArticleInput) -> Result<String> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(Error::Config {
            message: "Article name cannot be empty".to_string(),
        });
    }
    if input.price < 0.0 || !input.price.is_finite() {
        return Err(Error::InvalidAmount {
            amount: input.price,
        });
    }
    if input.stock < 0 {
        return Err(Error::InvalidQuantity {
            quantity: input.stock,
        });
    }
    Ok(name.to_string())
}

/// Retrieves all articles, ordered alphabetically by name.
pub async fn list_articles(store: &dyn Store) -> Result<Vec<article::Model>> {
    store.list_articles().await
}

/// Retrieves a specific article by its unique ID.
pub async fn get_article_by_id(store: &dyn Store, article_id: i64) -> Result<Option<article::Model>> {
    store.find_article(article_id).await
}

/// Retrieves the articles whose stock is at or below `threshold`.
///
/// The threshold comes from the persisted settings, see
/// [`crate::core::settings::Settings::low_stock_threshold`].
pub async fn low_stock_articles(
    store: &dyn Store,
    threshold: i64,
) -> Result<Vec<article::Model>> {
    let articles = store.list_articles().await?;
    Ok(articles.into_iter().filter(|a| a.stock <= threshold).collect())
}

/// Registers a new article, storing its image first when one is attached.
///
/// The registration price and stock are captured into `initial_price` and
/// `initial_stock`. If the row insert fails after the image was stored, the
/// stored image is deleted again best-effort so no orphan bytes remain.
pub async fn create_article(store: &dyn Store, input: ArticleInput) -> Result<article::Model> {
    let name = validate_input(&input)?;

    let image = match &input.image {
        Some(upload) => Some(store.store_image(&upload.name, &upload.bytes).await?),
        None => None,
    };

    let inserted = store
        .insert_article(NewArticle {
            name,
            category: input.category.clone(),
            image: image.clone(),
            price: input.price,
            stock: input.stock,
            initial_stock: input.stock,
            initial_price: input.price,
            created_at: chrono::Utc::now(),
        })
        .await;

    match inserted {
        Ok(article) => Ok(article),
        Err(err) => {
            // Compensate: the image is already persisted, take it back out
            if let Some(reference) = image {
                if let Err(cleanup) = store.delete_image(&reference).await {
                    warn!(%reference, error = %cleanup, "failed to roll back stored image after article insert failure");
                }
            }
            Err(err)
        }
    }
}

/// Updates an article's name, category, price, stock and image.
///
/// `initial_price` and `initial_stock` keep their registration values. When
/// a new image replaces an old one, the old bytes are deleted best-effort.
pub async fn update_article(
    store: &dyn Store,
    article_id: i64,
    input: ArticleInput,
) -> Result<article::Model> {
    let name = validate_input(&input)?;

    let existing = store
        .find_article(article_id)
        .await?
        .ok_or_else(|| Error::ArticleNotFound {
            id: article_id.to_string(),
        })?;

    let image = match &input.image {
        Some(upload) => {
            let reference = store.store_image(&upload.name, &upload.bytes).await?;
            if let Some(old) = &existing.image {
                if let Err(cleanup) = store.delete_image(old).await {
                    warn!(reference = %old, error = %cleanup, "failed to delete replaced article image");
                }
            }
            Some(reference)
        }
        None => existing.image.clone(),
    };

    store
        .update_article(article::Model {
            id: existing.id,
            name,
            category: input.category.clone(),
            image,
            price: input.price,
            stock: input.stock,
            initial_stock: existing.initial_stock,
            initial_price: existing.initial_price,
            created_at: existing.created_at,
        })
        .await
}

/// Deletes an article, unless sales still reference it.
///
/// The guard preserves the referential integrity of the denormalized sale
/// rows; the backend enforces no foreign-key cascade of its own. The
/// article's image, when present, is deleted best-effort after the row.
pub async fn delete_article(store: &dyn Store, article_id: i64) -> Result<()> {
    let article = store
        .find_article(article_id)
        .await?
        .ok_or_else(|| Error::ArticleNotFound {
            id: article_id.to_string(),
        })?;

    if store.article_has_sales(article.id).await? {
        return Err(Error::ArticleHasSales { id: article.id });
    }

    store.delete_article(article.id).await?;

    if let Some(reference) = &article.image {
        if let Err(cleanup) = store.delete_image(reference).await {
            warn!(%reference, error = %cleanup, "failed to delete image of removed article");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{
        article_input, create_test_article, create_test_sale, setup_database_store,
        setup_with_article,
    };

    #[tokio::test]
    async fn test_create_article_validation() -> Result<()> {
        let store = setup_database_store().await?;

        // Empty and whitespace-only names
        let result = create_article(&store, article_input("", 10.0, 5)).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        let result = create_article(&store, article_input("   ", 10.0, 5)).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        // Negative, NaN and infinite prices
        let result = create_article(&store, article_input("Rice", -1.0, 5)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: -1.0 }
        ));

        let result = create_article(&store, article_input("Rice", f64::NAN, 5)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: _ }));

        let result = create_article(&store, article_input("Rice", f64::INFINITY, 5)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: _ }));

        // Negative stock
        let result = create_article(&store, article_input("Rice", 10.0, -3)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidQuantity { quantity: -3 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_article_captures_initials() -> Result<()> {
        let store = setup_database_store().await?;

        let article = create_test_article(&store, "Rice 25kg", 40.0, 12).await?;
        assert_eq!(article.name, "Rice 25kg");
        assert_eq!(article.price, 40.0);
        assert_eq!(article.stock, 12);
        assert_eq!(article.initial_price, 40.0);
        assert_eq!(article.initial_stock, 12);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_article_with_image() -> Result<()> {
        let store = setup_database_store().await?;

        let mut input = article_input("Rice", 40.0, 12);
        input.image = Some(ImageUpload {
            name: "rice.png".to_string(),
            bytes: vec![1, 2, 3],
        });

        let article = create_article(&store, input).await?;
        let reference = article.image.unwrap();
        assert_eq!(store.load_image(&reference).await?, Some(vec![1, 2, 3]));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_article_keeps_initials() -> Result<()> {
        let store = setup_database_store().await?;
        let article = create_test_article(&store, "Rice", 40.0, 12).await?;

        let updated = update_article(&store, article.id, article_input("Rice 25kg", 45.0, 20)).await?;
        assert_eq!(updated.name, "Rice 25kg");
        assert_eq!(updated.price, 45.0);
        assert_eq!(updated.stock, 20);
        assert_eq!(updated.initial_price, 40.0);
        assert_eq!(updated.initial_stock, 12);
        assert_eq!(updated.created_at, article.created_at);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_article_replaces_image() -> Result<()> {
        let store = setup_database_store().await?;

        let mut input = article_input("Rice", 40.0, 12);
        input.image = Some(ImageUpload {
            name: "old.png".to_string(),
            bytes: vec![1],
        });
        let article = create_article(&store, input).await?;
        let old_reference = article.image.clone().unwrap();

        let mut input = article_input("Rice", 40.0, 12);
        input.image = Some(ImageUpload {
            name: "new.png".to_string(),
            bytes: vec![2],
        });
        let updated = update_article(&store, article.id, input).await?;
        let new_reference = updated.image.unwrap();

        assert_ne!(new_reference, old_reference);
        assert_eq!(store.load_image(&new_reference).await?, Some(vec![2]));
        assert_eq!(store.load_image(&old_reference).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_article_fails() -> Result<()> {
        let store = setup_database_store().await?;

        let result = update_article(&store, 999, article_input("Rice", 1.0, 1)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ArticleNotFound { id: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_article_without_sales() -> Result<()> {
        let store = setup_database_store().await?;
        let article = create_test_article(&store, "Rice", 40.0, 12).await?;

        delete_article(&store, article.id).await?;
        assert!(get_article_by_id(&store, article.id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_article_with_sales_is_rejected() -> Result<()> {
        let (store, article) = setup_with_article().await?;
        create_test_sale(&store, article.id, 2).await?;

        let result = delete_article(&store, article.id).await;
        assert!(matches!(result.unwrap_err(), Error::ArticleHasSales { id: _ }));

        // The article is left untouched
        let untouched = get_article_by_id(&store, article.id).await?.unwrap();
        assert_eq!(untouched.name, article.name);
        assert_eq!(untouched.stock, article.stock - 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_article_becomes_possible_after_sales_removed() -> Result<()> {
        let (store, article) = setup_with_article().await?;
        let sale = create_test_sale(&store, article.id, 2).await?;

        crate::core::sale::delete_sale(&store, sale.id).await?;
        delete_article(&store, article.id).await?;
        assert!(get_article_by_id(&store, article.id).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_low_stock_articles_filter() -> Result<()> {
        let store = setup_database_store().await?;
        create_test_article(&store, "Plenty", 1.0, 50).await?;
        let low = create_test_article(&store, "Scarce", 1.0, 3).await?;
        let exact = create_test_article(&store, "Borderline", 1.0, 5).await?;

        let flagged = low_stock_articles(&store, 5).await?;
        let ids: Vec<i64> = flagged.iter().map(|a| a.id).collect();
        assert_eq!(flagged.len(), 2);
        assert!(ids.contains(&low.id));
        assert!(ids.contains(&exact.id));

        Ok(())
    }
}
