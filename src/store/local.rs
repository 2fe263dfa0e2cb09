//! Local JSON-file [`Store`] backend.
//!
//! The offline fallback: the whole data set lives in one serde struct behind
//! an `RwLock`, loaded when the store is opened and written back to disk
//! after every mutation. All operations complete synchronously, so this
//! backend doubles as the reference implementation of the sale arithmetic
//! without any partial-failure risk. Image bytes are kept inline in the data
//! set rather than in files next to it.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;

use serde::{Deserialize, Serialize};

use super::{NewArticle, NewSale, NewUser, Store};
use crate::{
    entities::{article, sale, user},
    errors::{Error, Result},
};

/// Serialized shape of the whole local data set.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LocalData {
    next_article_id: i64,
    next_sale_id: i64,
    next_user_id: i64,
    next_image_id: i64,
    articles: Vec<article::Model>,
    sales: Vec<sale::Model>,
    users: Vec<user::Model>,
    settings: BTreeMap<String, String>,
    images: BTreeMap<String, Vec<u8>>,
}

/// [`Store`] implementation over an in-process data set with a JSON file
/// behind it.
#[derive(Debug)]
pub struct LocalStore {
    path: Option<PathBuf>,
    state: RwLock<LocalData>,
}

impl LocalStore {
    /// Opens the store at `path`, loading the existing data set if the file
    /// is present and starting empty otherwise.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str(&contents).map_err(|e| Error::Storage {
                message: format!("failed to parse {}: {e}", path.display()),
            })?
        } else {
            LocalData::default()
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            state: RwLock::new(data),
        })
    }

    /// Starts an empty store that is never written to disk. Used in tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(LocalData::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LocalData>> {
        self.state.read().map_err(|_| Error::Storage {
            message: "local store lock poisoned".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LocalData>> {
        self.state.write().map_err(|_| Error::Storage {
            message: "local store lock poisoned".to_string(),
        })
    }

    /// Writes the data set back to disk. Called after every mutation.
    fn flush(&self, data: &LocalData) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(data).map_err(|e| Error::Storage {
            message: format!("failed to serialize local data: {e}"),
        })?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[async_trait]
impl Store for LocalStore {
    async fn list_articles(&self) -> Result<Vec<article::Model>> {
        let data = self.read()?;
        let mut articles = data.articles.clone();
        articles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(articles)
    }

    async fn find_article(&self, id: i64) -> Result<Option<article::Model>> {
        let data = self.read()?;
        Ok(data.articles.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_article(&self, new: NewArticle) -> Result<article::Model> {
        let mut data = self.write()?;
        data.next_article_id += 1;
        let article = article::Model {
            id: data.next_article_id,
            name: new.name,
            category: new.category,
            image: new.image,
            price: new.price,
            stock: new.stock,
            initial_stock: new.initial_stock,
            initial_price: new.initial_price,
            created_at: new.created_at,
        };
        data.articles.push(article.clone());
        self.flush(&data)?;
        Ok(article)
    }

    async fn update_article(&self, article: article::Model) -> Result<article::Model> {
        let mut data = self.write()?;
        let slot = data
            .articles
            .iter_mut()
            .find(|a| a.id == article.id)
            .ok_or_else(|| Error::ArticleNotFound {
                id: article.id.to_string(),
            })?;
        *slot = article.clone();
        self.flush(&data)?;
        Ok(article)
    }

    async fn adjust_article_stock(&self, id: i64, delta: i64) -> Result<article::Model> {
        let mut data = self.write()?;
        let slot = data
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::ArticleNotFound { id: id.to_string() })?;
        slot.stock += delta;
        let updated = slot.clone();
        self.flush(&data)?;
        Ok(updated)
    }

    async fn delete_article(&self, id: i64) -> Result<()> {
        let mut data = self.write()?;
        data.articles.retain(|a| a.id != id);
        self.flush(&data)?;
        Ok(())
    }

    async fn article_has_sales(&self, article_id: i64) -> Result<bool> {
        let data = self.read()?;
        Ok(data.sales.iter().any(|s| s.article_id == article_id))
    }

    async fn list_sales(&self) -> Result<Vec<sale::Model>> {
        let data = self.read()?;
        let mut sales = data.sales.clone();
        sales.sort_by(|a, b| b.sold_at.cmp(&a.sold_at).then(b.id.cmp(&a.id)));
        Ok(sales)
    }

    async fn find_sale(&self, id: i64) -> Result<Option<sale::Model>> {
        let data = self.read()?;
        Ok(data.sales.iter().find(|s| s.id == id).cloned())
    }

    async fn sales_for_article(&self, article_id: i64) -> Result<Vec<sale::Model>> {
        let data = self.read()?;
        let mut sales: Vec<sale::Model> = data
            .sales
            .iter()
            .filter(|s| s.article_id == article_id)
            .cloned()
            .collect();
        sales.sort_by(|a, b| b.sold_at.cmp(&a.sold_at).then(b.id.cmp(&a.id)));
        Ok(sales)
    }

    async fn insert_sale(&self, new: NewSale) -> Result<sale::Model> {
        let mut data = self.write()?;
        data.next_sale_id += 1;
        let sale = sale::Model {
            id: data.next_sale_id,
            article_id: new.article_id,
            article_name: new.article_name,
            unit_price: new.unit_price,
            quantity: new.quantity,
            total_price: new.total_price,
            buyer: new.buyer,
            payment_method: new.payment_method,
            bank_name: new.bank_name,
            amount_paid: new.amount_paid,
            sold_at: new.sold_at,
        };
        data.sales.push(sale.clone());
        self.flush(&data)?;
        Ok(sale)
    }

    async fn update_sale(&self, sale: sale::Model) -> Result<sale::Model> {
        let mut data = self.write()?;
        let slot = data
            .sales
            .iter_mut()
            .find(|s| s.id == sale.id)
            .ok_or_else(|| Error::SaleNotFound {
                id: sale.id.to_string(),
            })?;
        *slot = sale.clone();
        self.flush(&data)?;
        Ok(sale)
    }

    async fn delete_sale(&self, id: i64) -> Result<()> {
        let mut data = self.write()?;
        data.sales.retain(|s| s.id != id);
        self.flush(&data)?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<user::Model>> {
        let data = self.read()?;
        let mut users = data.users.clone();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<user::Model>> {
        let data = self.read()?;
        Ok(data.users.iter().find(|u| u.name == name).cloned())
    }

    async fn insert_user(&self, new: NewUser) -> Result<user::Model> {
        let mut data = self.write()?;
        data.next_user_id += 1;
        let user = user::Model {
            id: data.next_user_id,
            name: new.name,
            pin: new.pin,
            created_at: new.created_at,
        };
        data.users.push(user.clone());
        self.flush(&data)?;
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<()> {
        let mut data = self.write()?;
        data.users.retain(|u| u.id != id);
        self.flush(&data)?;
        Ok(())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let data = self.read()?;
        Ok(data.settings.get(key).cloned())
    }

    async fn put_setting(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self.write()?;
        data.settings.insert(key.to_string(), value.to_string());
        self.flush(&data)?;
        Ok(())
    }

    async fn store_image(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let mut data = self.write()?;
        data.next_image_id += 1;
        let reference = format!("{}-{name}", data.next_image_id);
        data.images.insert(reference.clone(), bytes.to_vec());
        self.flush(&data)?;
        Ok(reference)
    }

    async fn load_image(&self, reference: &str) -> Result<Option<Vec<u8>>> {
        let data = self.read()?;
        Ok(data.images.get(reference).cloned())
    }

    async fn delete_image(&self, reference: &str) -> Result<()> {
        let mut data = self.write()?;
        data.images.remove(reference);
        self.flush(&data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::new_test_article;

    fn temp_store_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("shoptally-{label}-{}.json", std::process::id()))
    }

    #[tokio::test]
    async fn test_data_survives_reopen() -> Result<()> {
        let path = temp_store_path("reopen");
        let _ = std::fs::remove_file(&path);

        {
            let store = LocalStore::open(&path)?;
            store.insert_article(new_test_article("Flour", 3.0, 20)).await?;
            store.put_setting("theme", "dark").await?;
        }

        let reopened = LocalStore::open(&path)?;
        let articles = reopened.list_articles().await?;
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].name, "Flour");
        assert_eq!(articles[0].stock, 20);
        assert_eq!(
            reopened.get_setting("theme").await?,
            Some("dark".to_string())
        );

        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[tokio::test]
    async fn test_ids_keep_increasing_after_delete() -> Result<()> {
        let store = LocalStore::in_memory();

        let first = store.insert_article(new_test_article("A", 1.0, 1)).await?;
        store.delete_article(first.id).await?;
        let second = store.insert_article(new_test_article("B", 1.0, 1)).await?;

        // Freed ids are never reused, so stale references cannot resolve to
        // a different article.
        assert!(second.id > first.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_article_fails() -> Result<()> {
        let store = LocalStore::in_memory();
        let article = new_test_article("Ghost", 1.0, 1);
        let model = article::Model {
            id: 42,
            name: article.name,
            category: article.category,
            image: article.image,
            price: article.price,
            stock: article.stock,
            initial_stock: article.initial_stock,
            initial_price: article.initial_price,
            created_at: article.created_at,
        };

        let result = store.update_article(model).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ArticleNotFound { id: _ }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_image_roundtrip() -> Result<()> {
        let store = LocalStore::in_memory();

        let reference = store.store_image("flour.png", &[9, 8, 7]).await?;
        assert_eq!(store.load_image(&reference).await?, Some(vec![9, 8, 7]));

        store.delete_image(&reference).await?;
        assert_eq!(store.load_image(&reference).await?, None);
        Ok(())
    }
}
