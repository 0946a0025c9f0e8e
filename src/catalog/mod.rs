//! Catalog read interface.
//!
//! Providers never fail towards the caller: a backing-store error is logged
//! and surfaces as an empty list, which the wizard treats as "nothing
//! available yet".

mod postgres;
mod seed;

pub use postgres::PgCatalog;
pub use seed::StaticCatalog;

use async_trait::async_trait;

use crate::domain::catalog::{Catalog, Flavor, FlavorPairing, Frosting, ProductSize, ProductType, Topping};

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn list_product_types(&self) -> Vec<ProductType>;
    async fn list_product_sizes(&self) -> Vec<ProductSize>;
    async fn list_flavors(&self) -> Vec<Flavor>;
    async fn list_frostings(&self) -> Vec<Frosting>;
    async fn list_toppings(&self) -> Vec<Topping>;
    async fn list_flavor_pairings(&self) -> Vec<FlavorPairing>;
}

/// Fetches every option list concurrently into one snapshot.
pub async fn load(provider: &dyn CatalogProvider) -> Catalog {
    let (product_types, product_sizes, flavors, frostings, toppings, flavor_pairings) = tokio::join!(
        provider.list_product_types(),
        provider.list_product_sizes(),
        provider.list_flavors(),
        provider.list_frostings(),
        provider.list_toppings(),
        provider.list_flavor_pairings(),
    );
    let catalog = Catalog { product_types, product_sizes, flavors, frostings, toppings, flavor_pairings };
    tracing::info!(
        types = catalog.product_types.len(),
        sizes = catalog.product_sizes.len(),
        flavors = catalog.flavors.len(),
        frostings = catalog.frostings.len(),
        toppings = catalog.toppings.len(),
        "catalog loaded"
    );
    catalog
}
