//! Built-in bakery catalog, mirrored by the seed migration.

use async_trait::async_trait;

use super::CatalogProvider;
use crate::domain::catalog::{Catalog, Flavor, FlavorPairing, Frosting, ProductSize, ProductType, Topping};
use crate::domain::value_objects::Money;

/// In-memory provider serving a fixed catalog.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    catalog: Catalog,
}

impl StaticCatalog {
    pub fn new(catalog: Catalog) -> Self { Self { catalog } }
    pub fn snapshot(&self) -> Catalog { self.catalog.clone() }

    /// Cakes and cupcakes with the house flavors, frostings and toppings.
    pub fn bakery() -> Self {
        let product_types = vec![
            product_type(1, "cake", "Cake", "Layered celebration cakes, baked and decorated to order"),
            product_type(2, "cupcake", "Cupcakes", "Boxed cupcakes with matching frosting and toppings"),
        ];
        let product_sizes = vec![
            size(1, 1, "6-inch", "6\" Round", (8, 10), 2500),
            size(2, 1, "8-inch", "8\" Round", (12, 16), 3500),
            size(3, 1, "10-inch", "10\" Round", (20, 25), 4500),
            size(4, 2, "6-count", "6 Cupcakes", (6, 6), 1800),
            size(5, 2, "12-count", "12 Cupcakes", (12, 12), 3200),
            size(6, 2, "24-count", "24 Cupcakes", (24, 24), 6000),
        ];
        let flavors = [
            ("vanilla", "Vanilla", "Madagascar vanilla sponge"),
            ("chocolate", "Chocolate", "Dark cocoa crumb"),
            ("red-velvet", "Red Velvet", "Buttermilk cocoa with a hint of tang"),
            ("lemon", "Lemon", "Zesty lemon sponge"),
            ("funfetti", "Funfetti", "Vanilla sponge with rainbow sprinkles"),
            ("carrot", "Carrot", "Spiced carrot and walnut"),
        ]
        .into_iter()
        .zip(1..)
        .map(|((slug, name, description), id)| Flavor { id, slug: slug.into(), name: name.into(), description: description.into() })
        .collect();
        let frostings = [
            ("buttercream", "Buttercream", "Classic whipped butter and sugar"),
            ("cream-cheese", "Cream Cheese", "Tangy and smooth"),
            ("chocolate-ganache", "Chocolate Ganache", "Glossy dark chocolate"),
            ("whipped-cream", "Whipped Cream", "Light and airy"),
            ("fondant", "Fondant", "Smooth sugar paste finish"),
        ]
        .into_iter()
        .zip(1..)
        .map(|((slug, name, description), id)| Frosting { id, slug: slug.into(), name: name.into(), description: description.into() })
        .collect();
        let toppings = [
            ("sprinkles", "Rainbow Sprinkles", 300),
            ("fondant-flowers", "Fondant Flowers", 800),
            ("fresh-berries", "Fresh Berries", 600),
            ("chocolate-shavings", "Chocolate Shavings", 400),
            ("edible-glitter", "Edible Glitter", 500),
            ("macarons", "Macarons", 1000),
        ]
        .into_iter()
        .zip(1..)
        .map(|((slug, name, cents), id)| Topping {
            id, slug: slug.into(), name: name.into(), description: String::new(), price: Money::from_cents(cents),
        })
        .collect();
        // (flavor id, frosting id)
        let flavor_pairings = [(1, 1), (2, 3), (2, 1), (3, 2), (4, 4), (4, 1), (5, 1), (6, 2)]
            .into_iter()
            .zip(1..)
            .map(|((flavor_id, frosting_id), id)| FlavorPairing { id, flavor_id, frosting_id })
            .collect();

        Self::new(Catalog { product_types, product_sizes, flavors, frostings, toppings, flavor_pairings })
    }
}

fn product_type(id: i64, slug: &str, name: &str, description: &str) -> ProductType {
    ProductType { id, slug: slug.into(), name: name.into(), description: description.into() }
}

fn size(id: i64, product_type_id: i64, slug: &str, name: &str, serves: (i32, i32), cents: i64) -> ProductSize {
    ProductSize {
        id, product_type_id, slug: slug.into(), name: name.into(), description: String::new(),
        serves_min: Some(serves.0), serves_max: Some(serves.1), price: Money::from_cents(cents),
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn list_product_types(&self) -> Vec<ProductType> { self.catalog.product_types.clone() }
    async fn list_product_sizes(&self) -> Vec<ProductSize> { self.catalog.product_sizes.clone() }
    async fn list_flavors(&self) -> Vec<Flavor> { self.catalog.flavors.clone() }
    async fn list_frostings(&self) -> Vec<Frosting> { self.catalog.frostings.clone() }
    async fn list_toppings(&self) -> Vec<Topping> { self.catalog.toppings.clone() }
    async fn list_flavor_pairings(&self) -> Vec<FlavorPairing> { self.catalog.flavor_pairings.clone() }
}
