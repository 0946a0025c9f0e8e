//! Aggregates module
pub mod cart;
pub mod draft;
pub mod wizard;

pub use cart::{CartLineItem, CartStore};
pub use draft::{DraftOrder, DraftUpdate, DEFAULT_NAME};
pub use wizard::{CatalogState, OrderWizard, WizardStep};
