//! Unit price of a configured bakery item.

use crate::domain::catalog::Catalog;
use crate::domain::value_objects::Money;

/// Base price of the size chosen for `product_type` plus every selected
/// topping.
///
/// A size that does not belong to `product_type` (or no size at all)
/// contributes nothing, as does any topping slug missing from the catalog.
pub fn compute_price<S: AsRef<str>>(product_type: &str, size: &str, toppings: &[S], catalog: &Catalog) -> Money {
    let base = catalog.size(product_type, size).map(|s| s.price).unwrap_or_default();
    let surcharge: Money = toppings
        .iter()
        .filter_map(|slug| catalog.topping(slug.as_ref()))
        .map(|t| t.price)
        .sum();
    base.add(&surcharge)
}
