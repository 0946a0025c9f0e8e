//! Option lists as offered on each wizard step, marked up for the current draft.

use serde::Serialize;

use crate::domain::aggregates::DraftOrder;
use crate::domain::catalog::Catalog;
use crate::domain::value_objects::Money;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SizeOption {
    pub slug: String,
    pub label: String,
    pub price: Money,
    pub price_label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrostingOption {
    pub slug: String,
    pub name: String,
    /// Paired with the selected flavor. Never restricts the choice.
    pub recommended: bool,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToppingOption {
    pub slug: String,
    pub name: String,
    pub price: Money,
    pub price_label: String,
    pub selected: bool,
}

/// Sizes of the draft's product type only.
pub fn size_options(draft: &DraftOrder, catalog: &Catalog) -> Vec<SizeOption> {
    catalog
        .sizes_for(draft.product_type())
        .map(|s| SizeOption {
            slug: s.slug.clone(),
            label: s.label(),
            price: s.price,
            price_label: s.price.to_string(),
            selected: s.slug == draft.size(),
        })
        .collect()
}

/// Every frosting, with the ones paired to the chosen flavor flagged.
pub fn frosting_options(draft: &DraftOrder, catalog: &Catalog) -> Vec<FrostingOption> {
    let recommended = catalog.recommended_frostings(draft.flavor());
    catalog
        .frostings
        .iter()
        .map(|f| FrostingOption {
            slug: f.slug.clone(),
            name: f.name.clone(),
            recommended: recommended.contains(&f.slug.as_str()),
            selected: f.slug == draft.frosting(),
        })
        .collect()
}

pub fn topping_options(draft: &DraftOrder, catalog: &Catalog) -> Vec<ToppingOption> {
    catalog
        .toppings
        .iter()
        .map(|t| ToppingOption {
            slug: t.slug.clone(),
            name: t.name.clone(),
            price: t.price,
            price_label: format!("+{}", t.price),
            selected: draft.toppings().contains(&t.slug),
        })
        .collect()
}
