//! Draft Order
//!
//! The in-progress configuration behind the order wizard. A draft is never
//! edited in place: every update produces a new draft, and the unit price is
//! recomputed from the catalog as part of building it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::aggregates::cart::CartLineItem;
use crate::domain::catalog::Catalog;
use crate::domain::pricing::compute_price;
use crate::domain::value_objects::{Money, Quantity};

/// Display name used until a product type is resolved.
pub const DEFAULT_NAME: &str = "Custom Order";

/// A single change to one draft field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum DraftUpdate {
    /// Also clears the size, since sizes belong to a type. The price is then
    /// recomputed like after any other update rather than forced to zero, so
    /// selected toppings still count: a switch with no toppings yields 0, a
    /// switch with toppings yields their surcharge.
    ProductType(String),
    Size(String),
    Flavor(String),
    Frosting(String),
    Toppings(Vec<String>),
    ToggleTopping(String),
    Message(Option<String>),
    ImageUrl(Option<String>),
    Quantity(i64),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DraftOrder {
    id: String,
    product_type: String,
    name: String,
    size: String,
    flavor: String,
    frosting: String,
    toppings: Vec<String>,
    message: Option<String>,
    image_url: Option<String>,
    price: Money,
    quantity: Quantity,
}

impl Default for DraftOrder {
    fn default() -> Self { Self::new() }
}

impl DraftOrder {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(), product_type: String::new(), name: DEFAULT_NAME.to_string(),
            size: String::new(), flavor: String::new(), frosting: String::new(), toppings: vec![],
            message: None, image_url: None, price: Money::zero(), quantity: Quantity::default(),
        }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn product_type(&self) -> &str { &self.product_type }
    pub fn name(&self) -> &str { &self.name }
    pub fn size(&self) -> &str { &self.size }
    pub fn flavor(&self) -> &str { &self.flavor }
    pub fn frosting(&self) -> &str { &self.frosting }
    /// Selected topping slugs, in the order they were picked.
    pub fn toppings(&self) -> &[String] { &self.toppings }
    pub fn message(&self) -> Option<&str> { self.message.as_deref() }
    pub fn image_url(&self) -> Option<&str> { self.image_url.as_deref() }
    pub fn price(&self) -> Money { self.price }
    pub fn quantity(&self) -> Quantity { self.quantity }
    pub fn line_total(&self) -> Money { self.price.multiply(self.quantity.value()) }

    /// Size, flavor and frosting are all chosen.
    pub fn is_complete(&self) -> bool {
        !self.size.is_empty() && !self.flavor.is_empty() && !self.frosting.is_empty()
    }

    /// Returns the draft with `update` applied and its price recomputed.
    pub fn apply(&self, update: DraftUpdate, catalog: &Catalog) -> DraftOrder {
        let mut next = self.clone();
        match update {
            DraftUpdate::ProductType(slug) => {
                next.name = catalog.product_type(&slug).map(|t| t.name.clone()).unwrap_or_else(|| DEFAULT_NAME.to_string());
                next.product_type = slug;
                next.size.clear();
            }
            DraftUpdate::Size(slug) => next.size = slug,
            DraftUpdate::Flavor(slug) => next.flavor = slug,
            DraftUpdate::Frosting(slug) => next.frosting = slug,
            DraftUpdate::Toppings(slugs) => {
                next.toppings.clear();
                for slug in slugs {
                    if !next.toppings.contains(&slug) { next.toppings.push(slug); }
                }
            }
            DraftUpdate::ToggleTopping(slug) => {
                if let Some(pos) = next.toppings.iter().position(|t| *t == slug) { next.toppings.remove(pos); }
                else { next.toppings.push(slug); }
            }
            DraftUpdate::Message(message) => next.message = message.filter(|m| !m.trim().is_empty()),
            DraftUpdate::ImageUrl(url) => next.image_url = url.filter(|u| !u.trim().is_empty()),
            DraftUpdate::Quantity(qty) => next.quantity = Quantity::clamped(qty),
        }
        next.price = compute_price(&next.product_type, &next.size, &next.toppings, catalog);
        next
    }

    /// Snapshot for the cart; the line item keeps this draft's id.
    pub fn to_line_item(&self) -> CartLineItem {
        CartLineItem {
            id: self.id.clone(), product_type: self.product_type.clone(), name: self.name.clone(),
            size: self.size.clone(), flavor: self.flavor.clone(), frosting: self.frosting.clone(),
            toppings: self.toppings.clone(), message: self.message.clone(), image_url: self.image_url.clone(),
            price: self.price, quantity: self.quantity.value(),
        }
    }
}
