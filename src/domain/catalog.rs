//! Catalog entities
//!
//! Read-only option lists the order wizard offers. Selections refer to
//! entries by slug; sizes are scoped to their parent product type, so a size
//! is only identified by the pair (type slug, size slug).

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Money;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductType {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductSize {
    pub id: i64,
    pub product_type_id: i64,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub serves_min: Option<i32>,
    pub serves_max: Option<i32>,
    #[sqlx(try_from = "rust_decimal::Decimal")]
    pub price: Money,
}

impl ProductSize {
    /// Serving range, only when both bounds are present, positive and ordered.
    pub fn serving_range(&self) -> Option<(i32, i32)> {
        match (self.serves_min, self.serves_max) {
            (Some(min), Some(max)) if min > 0 && min <= max => Some((min, max)),
            _ => None,
        }
    }

    /// "8-inch (serves 10-12)" style label for the size picker.
    pub fn label(&self) -> String {
        match self.serving_range() {
            Some((min, max)) => format!("{} (serves {}-{})", self.name, min, max),
            None => self.name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Flavor {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Frosting {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Topping {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub description: String,
    #[sqlx(try_from = "rust_decimal::Decimal")]
    pub price: Money,
}

/// Advisory link between a flavor and a frosting that suits it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FlavorPairing {
    pub id: i64,
    pub flavor_id: i64,
    pub frosting_id: i64,
}

/// Snapshot of every option list, as loaded for one session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub product_types: Vec<ProductType>,
    pub product_sizes: Vec<ProductSize>,
    pub flavors: Vec<Flavor>,
    pub frostings: Vec<Frosting>,
    pub toppings: Vec<Topping>,
    pub flavor_pairings: Vec<FlavorPairing>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.product_types.is_empty()
            && self.product_sizes.is_empty()
            && self.flavors.is_empty()
            && self.frostings.is_empty()
            && self.toppings.is_empty()
    }

    pub fn product_type(&self, slug: &str) -> Option<&ProductType> {
        self.product_types.iter().find(|t| t.slug == slug)
    }

    /// Sizes whose parent is the type with `type_slug`, in catalog order.
    pub fn sizes_for<'a>(&'a self, type_slug: &str) -> impl Iterator<Item = &'a ProductSize> + 'a {
        let type_id = self.product_type(type_slug).map(|t| t.id);
        self.product_sizes.iter().filter(move |s| Some(s.product_type_id) == type_id)
    }

    pub fn size(&self, type_slug: &str, size_slug: &str) -> Option<&ProductSize> {
        if size_slug.is_empty() {
            return None;
        }
        self.sizes_for(type_slug).find(|s| s.slug == size_slug)
    }

    pub fn flavor(&self, slug: &str) -> Option<&Flavor> { self.flavors.iter().find(|f| f.slug == slug) }
    pub fn frosting(&self, slug: &str) -> Option<&Frosting> { self.frostings.iter().find(|f| f.slug == slug) }
    pub fn topping(&self, slug: &str) -> Option<&Topping> { self.toppings.iter().find(|t| t.slug == slug) }

    /// Slugs of the frostings paired with `flavor_slug`. Advisory only.
    pub fn recommended_frostings(&self, flavor_slug: &str) -> Vec<&str> {
        let Some(flavor) = self.flavor(flavor_slug) else { return Vec::new() };
        self.flavor_pairings
            .iter()
            .filter(|p| p.flavor_id == flavor.id)
            .filter_map(|p| self.frostings.iter().find(|f| f.id == p.frosting_id))
            .map(|f| f.slug.as_str())
            .collect()
    }
}
