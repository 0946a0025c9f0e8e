//! Read-only summary of a draft, resolved against the catalog.

use std::fmt;

use serde::Serialize;

use crate::domain::aggregates::DraftOrder;
use crate::domain::catalog::Catalog;
use crate::domain::value_objects::Money;

pub const NOT_SELECTED: &str = "Not selected";
pub const NO_TOPPINGS: &str = "None selected";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderPreview {
    pub product: String,
    pub size: String,
    pub flavor: String,
    pub frosting: String,
    pub toppings: String,
    pub message: Option<String>,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

impl OrderPreview {
    pub fn project(draft: &DraftOrder, catalog: &Catalog) -> Self {
        let label = |name: Option<&String>| name.cloned().unwrap_or_else(|| NOT_SELECTED.to_string());
        let toppings: Vec<&str> = draft
            .toppings()
            .iter()
            .filter_map(|slug| catalog.topping(slug))
            .map(|t| t.name.as_str())
            .collect();

        Self {
            product: label(catalog.product_type(draft.product_type()).map(|t| &t.name)),
            size: label(catalog.size(draft.product_type(), draft.size()).map(|s| &s.name)),
            flavor: label(catalog.flavor(draft.flavor()).map(|f| &f.name)),
            frosting: label(catalog.frosting(draft.frosting()).map(|f| &f.name)),
            toppings: if toppings.is_empty() { NO_TOPPINGS.to_string() } else { toppings.join(", ") },
            message: draft.message().map(str::to_string),
            quantity: draft.quantity().value(),
            unit_price: draft.price(),
            line_total: draft.line_total(),
        }
    }
}

impl fmt::Display for OrderPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.product)?;
        writeln!(f, "Size: {}", self.size)?;
        writeln!(f, "Flavor: {}", self.flavor)?;
        writeln!(f, "Frosting: {}", self.frosting)?;
        writeln!(f, "Toppings: {}", self.toppings)?;
        if let Some(message) = &self.message {
            writeln!(f, "Message: {}", message)?;
        }
        writeln!(f, "Quantity: {}", self.quantity)?;
        writeln!(f, "Price per item: {}", self.unit_price)?;
        writeln!(f, "Quantity: x{}", self.quantity)?;
        write!(f, "Total: {}", self.line_total)
    }
}
