//! Bakery Storefront - custom cake and cupcake ordering service

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bakery_storefront::api::{self, AppState, SessionCart};
use bakery_storefront::{CartStore, CatalogProvider, Config, JsonFileStorage, OrderWizard, PgCatalog, StaticCatalog, StubGateway};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;

    let provider: Arc<dyn CatalogProvider> = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new().max_connections(config.max_connections).connect(url).await?;
            sqlx::migrate!("./migrations").run(&db).await?;
            Arc::new(PgCatalog::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, serving the built-in catalog");
            Arc::new(StaticCatalog::bakery())
        }
    };

    let cart: SessionCart = CartStore::open(Box::new(JsonFileStorage::new(&config.cart_store_path)));
    tracing::info!(path = %config.cart_store_path.display(), items = cart.item_count(), "cart restored");
    let state = AppState::new(OrderWizard::new(), cart, Arc::new(StubGateway));
    api::spawn_catalog_fetch(&state, provider).await;

    let app = api::router(state.clone());
    tracing::info!("🚀 Bakery Storefront listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?, app)
        .with_graceful_shutdown(async { tokio::signal::ctrl_c().await.ok(); })
        .await?;
    state.close_cart().await;
    tracing::info!("cart saved, shutting down");
    Ok(())
}
