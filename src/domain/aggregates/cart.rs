//! Cart Aggregate
//!
//! Finalized line items for the current session. The store owns an injected
//! [`CartStorage`]: it restores from it once when opened and writes back
//! after every mutation. Writes are best effort; a failed write is logged and
//! the in-memory cart stays authoritative.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Money;
use crate::storage::CartStorage;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub name: String,
    pub size: String,
    pub flavor: String,
    pub frosting: String,
    pub toppings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub price: Money,
    pub quantity: u32,
}

impl CartLineItem {
    pub fn line_total(&self) -> Money { self.price.multiply(self.quantity) }
}

pub struct CartStore<S: CartStorage> {
    storage: S,
    items: Vec<CartLineItem>,
    total: Money,
}

impl<S: CartStorage> CartStore<S> {
    /// Restores whatever `storage` holds; anything unreadable starts empty.
    /// Stored lines sharing an id are folded into one, quantities summed.
    pub fn open(mut storage: S) -> Self {
        let items = fold_duplicates(storage.load_cart().unwrap_or_default());
        tracing::debug!(items = items.len(), "cart restored");
        let mut store = Self { storage, items, total: Money::zero() };
        store.recalculate();
        store
    }

    /// Final write, then hands the storage back.
    pub fn close(mut self) -> S {
        self.persist();
        self.storage
    }

    pub fn items(&self) -> &[CartLineItem] { &self.items }
    pub fn total(&self) -> Money { self.total }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn get(&self, id: &str) -> Option<&CartLineItem> { self.items.iter().find(|i| i.id == id) }
    /// Sum of quantities across all lines.
    pub fn item_count(&self) -> u32 { self.items.iter().map(|i| i.quantity).sum() }

    /// Appends `item`, or adds its quantity to the line with the same id.
    /// On merge the existing line keeps all of its other fields.
    pub fn add(&mut self, item: CartLineItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
            tracing::debug!(id = %item.id, quantity = existing.quantity, "cart line merged");
        } else {
            tracing::debug!(id = %item.id, quantity = item.quantity, "cart line added");
            self.items.push(item);
        }
        self.commit();
    }

    /// Sets the quantity exactly; zero or less removes the line. Unknown ids are ignored.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(id);
        }
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else { return false };
        item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        self.commit();
        true
    }

    /// Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        if self.items.len() == before {
            return false;
        }
        self.commit();
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.commit();
    }

    fn commit(&mut self) {
        self.recalculate();
        self.persist();
    }

    fn recalculate(&mut self) {
        self.total = self.items.iter().map(CartLineItem::line_total).sum();
    }

    fn persist(&mut self) {
        if let Err(e) = self.storage.save_cart(&self.items) {
            tracing::warn!(error = %e, "failed to persist cart, keeping in-memory state");
        }
    }
}

fn fold_duplicates(items: Vec<CartLineItem>) -> Vec<CartLineItem> {
    let mut folded: Vec<CartLineItem> = Vec::with_capacity(items.len());
    for item in items {
        match folded.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => folded.push(item),
        }
    }
    folded
}
