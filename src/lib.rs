//! Bakery Storefront
//!
//! Custom-order storefront for a bakery: customers configure a cake or a
//! batch of cupcakes step by step, see the price as they go, and collect
//! finished configurations in a cart that survives restarts.
//!
//! ## Features
//! - Catalog of product types, sizes, flavors, frostings and toppings
//! - Four-step order wizard with live pricing and an order preview
//! - Persistent shopping cart
//! - Checkout with pickup or delivery

pub mod api;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod storage;

use thiserror::Error;

pub use catalog::{CatalogProvider, PgCatalog, StaticCatalog};
pub use checkout::{CheckoutError, CheckoutGateway, StubGateway};
pub use config::{Config, ConfigError};
pub use domain::aggregates::{CartLineItem, CartStore, DraftOrder, DraftUpdate, OrderWizard, WizardStep};
pub use domain::catalog::Catalog;
pub use domain::pricing::compute_price;
pub use domain::value_objects::Money;
pub use storage::{CartStorage, JsonFileStorage, MemoryStorage, StorageError};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
