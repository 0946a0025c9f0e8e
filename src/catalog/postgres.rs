//! Catalog backed by Postgres.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};

use super::CatalogProvider;
use crate::domain::catalog::{Flavor, FlavorPairing, Frosting, ProductSize, ProductType, Topping};

#[derive(Clone)]
pub struct PgCatalog {
    db: PgPool,
}

impl PgCatalog {
    pub fn new(db: PgPool) -> Self { Self { db } }

    async fn fetch_or_empty<T>(&self, table: &'static str, sql: &'static str) -> Vec<T>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        match sqlx::query_as::<_, T>(sql).fetch_all(&self.db).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(table, error = %e, "catalog fetch failed, serving an empty list");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl CatalogProvider for PgCatalog {
    async fn list_product_types(&self) -> Vec<ProductType> {
        self.fetch_or_empty("product_types", "SELECT id, slug, name, description FROM product_types ORDER BY id").await
    }

    async fn list_product_sizes(&self) -> Vec<ProductSize> {
        self.fetch_or_empty(
            "product_sizes",
            "SELECT id, product_type_id, slug, name, description, serves_min, serves_max, price FROM product_sizes ORDER BY product_type_id, price",
        )
        .await
    }

    async fn list_flavors(&self) -> Vec<Flavor> {
        self.fetch_or_empty("flavors", "SELECT id, slug, name, description FROM flavors ORDER BY id").await
    }

    async fn list_frostings(&self) -> Vec<Frosting> {
        self.fetch_or_empty("frostings", "SELECT id, slug, name, description FROM frostings ORDER BY id").await
    }

    async fn list_toppings(&self) -> Vec<Topping> {
        self.fetch_or_empty("toppings", "SELECT id, slug, name, description, price FROM toppings ORDER BY id").await
    }

    async fn list_flavor_pairings(&self) -> Vec<FlavorPairing> {
        self.fetch_or_empty("flavor_pairings", "SELECT id, flavor_id, frosting_id FROM flavor_pairings ORDER BY id").await
    }
}
