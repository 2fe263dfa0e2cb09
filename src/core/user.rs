//! User account business logic - sub-business accounts and PIN checks.
//!
//! Accounts are looked up by name; names are unique. The PIN check is a
//! clear-text string comparison against the stored value, nothing more.

use crate::{
    entities::user,
    errors::{Error, Result},
    store::{NewUser, Store},
};

/// PIN shape accepted at account creation: 4 to 8 ASCII digits.
fn validate_pin(pin: &str) -> Result<()> {
    if pin.len() < 4 || pin.len() > 8 || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Config {
            message: "PIN must be 4 to 8 digits".to_string(),
        });
    }
    Ok(())
}

/// Retrieves all accounts, ordered alphabetically by name.
pub async fn list_users(store: &dyn Store) -> Result<Vec<user::Model>> {
    store.list_users().await
}

/// Finds an account by its name.
pub async fn get_user_by_name(store: &dyn Store, name: &str) -> Result<Option<user::Model>> {
    store.find_user_by_name(name).await
}

/// Creates a new account with a unique name and a digit PIN.
pub async fn create_user(store: &dyn Store, name: String, pin: String) -> Result<user::Model> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Config {
            message: "User name cannot be empty".to_string(),
        });
    }
    validate_pin(&pin)?;

    if store.find_user_by_name(&name).await?.is_some() {
        return Err(Error::DuplicateUser { name });
    }

    store
        .insert_user(NewUser {
            name,
            pin,
            created_at: chrono::Utc::now(),
        })
        .await
}

/// Deletes the account with the given name.
pub async fn delete_user(store: &dyn Store, name: &str) -> Result<()> {
    let user = store
        .find_user_by_name(name)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            name: name.to_string(),
        })?;
    store.delete_user(user.id).await
}

/// Checks a PIN against the stored one.
///
/// Clear-text equality, byte for byte. No hashing, no rate limiting; the
/// caller only gates a single-tenant UI session with it.
pub async fn verify_pin(store: &dyn Store, name: &str, pin: &str) -> Result<bool> {
    let user = store
        .find_user_by_name(name)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            name: name.to_string(),
        })?;
    Ok(user.pin == pin)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_database_store;

    #[tokio::test]
    async fn test_create_user_validation() -> Result<()> {
        let store = setup_database_store().await?;

        let result = create_user(&store, "  ".to_string(), "1234".to_string()).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        // Too short, too long, non-digit
        for pin in ["123", "123456789", "12a4"] {
            let result = create_user(&store, "Kiosk".to_string(), pin.to_string()).await;
            assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_name() -> Result<()> {
        let store = setup_database_store().await?;

        create_user(&store, "Kiosk".to_string(), "1234".to_string()).await?;
        let result = create_user(&store, "Kiosk".to_string(), "5678".to_string()).await;
        assert!(matches!(result.unwrap_err(), Error::DuplicateUser { name: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_verify_pin() -> Result<()> {
        let store = setup_database_store().await?;
        create_user(&store, "Kiosk".to_string(), "1234".to_string()).await?;

        assert!(verify_pin(&store, "Kiosk", "1234").await?);
        assert!(!verify_pin(&store, "Kiosk", "0000").await?);

        let result = verify_pin(&store, "Nobody", "1234").await;
        assert!(matches!(result.unwrap_err(), Error::UserNotFound { name: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_user() -> Result<()> {
        let store = setup_database_store().await?;
        create_user(&store, "Kiosk".to_string(), "1234".to_string()).await?;

        delete_user(&store, "Kiosk").await?;
        assert!(get_user_by_name(&store, "Kiosk").await?.is_none());

        let result = delete_user(&store, "Kiosk").await;
        assert!(matches!(result.unwrap_err(), Error::UserNotFound { name: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_users_ordered() -> Result<()> {
        let store = setup_database_store().await?;
        create_user(&store, "Zara".to_string(), "1234".to_string()).await?;
        create_user(&store, "Amma".to_string(), "5678".to_string()).await?;

        let users = list_users(&store).await?;
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "Amma");
        assert_eq!(users[1].name, "Zara");

        Ok(())
    }
}
