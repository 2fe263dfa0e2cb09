//! Headless bootstrap for `ShopTally`.
//!
//! Opens the configured storage backend, seeds the default settings on first
//! run and logs an inventory status summary. The UI layer embeds the library
//! directly; this binary exists to initialize a deployment and to check that
//! the configured backend is reachable.

use dotenvy::dotenv;
use shoptally::{config, core, errors::Result, store};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration; a missing config.toml is fine
    let app_config = match config::app::load_default_config() {
        Ok(config) => config,
        Err(err) => {
            warn!("No usable config.toml ({err}), continuing with defaults.");
            config::app::AppConfig::default()
        }
    };

    // 4. Open the configured storage backend
    let store = store::open_store(&app_config).await?;
    info!("Storage backend initialized successfully.");

    // 5. Seed default settings on first run
    let defaults = app_config.defaults.as_settings();
    if core::settings::seed_default_settings(store.as_ref(), &defaults).await? {
        info!("Seeded default settings from configuration.");
    }

    // 6. Log an inventory status summary
    let settings = core::settings::load_settings(store.as_ref()).await?;
    let articles = core::article::list_articles(store.as_ref()).await?;
    let users = core::user::list_users(store.as_ref()).await?;
    let sales = core::sale::list_sales(store.as_ref()).await?;
    info!(
        articles = articles.len(),
        sales = sales.len(),
        users = users.len(),
        "Store is ready."
    );

    let low_stock =
        core::article::low_stock_articles(store.as_ref(), settings.low_stock_threshold).await?;
    for article in &low_stock {
        warn!(
            article = %article.name,
            stock = article.stock,
            threshold = settings.low_stock_threshold,
            "Article is low on stock."
        );
    }

    Ok(())
}
