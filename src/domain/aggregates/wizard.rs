//! Order Wizard
//!
//! Linear four-step configuration flow. Guards never fail loudly: a
//! transition that is not allowed simply leaves the wizard where it is, and
//! the caller is expected to have disabled the action via the `can_*`
//! queries.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::aggregates::cart::{CartLineItem, CartStore};
use crate::domain::aggregates::draft::{DraftOrder, DraftUpdate};
use crate::domain::catalog::Catalog;
use crate::storage::CartStorage;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    SelectSize,
    SelectFlavorFrosting,
    SelectToppings,
    Finalize,
}

impl WizardStep {
    /// 1-indexed position.
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::SelectSize => 1,
            WizardStep::SelectFlavorFrosting => 2,
            WizardStep::SelectToppings => 3,
            WizardStep::Finalize => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::SelectSize => "Choose Your Size",
            WizardStep::SelectFlavorFrosting => "Choose Your Flavors",
            WizardStep::SelectToppings => "Choose Your Toppings",
            WizardStep::Finalize => "Finishing Details",
        }
    }

    fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::SelectSize => Some(WizardStep::SelectFlavorFrosting),
            WizardStep::SelectFlavorFrosting => Some(WizardStep::SelectToppings),
            WizardStep::SelectToppings => Some(WizardStep::Finalize),
            WizardStep::Finalize => None,
        }
    }

    fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::SelectSize => None,
            WizardStep::SelectFlavorFrosting => Some(WizardStep::SelectSize),
            WizardStep::SelectToppings => Some(WizardStep::SelectFlavorFrosting),
            WizardStep::Finalize => Some(WizardStep::SelectToppings),
        }
    }
}

/// Where the wizard's option lists come from.
#[derive(Clone, Debug, Default)]
pub enum CatalogState {
    /// No fetch issued yet.
    #[default]
    Idle,
    /// A fetch is outstanding.
    Loading,
    Ready(Arc<Catalog>),
}

#[derive(Clone, Debug, Default)]
pub struct OrderWizard {
    step: WizardStep,
    draft: DraftOrder,
    catalog: CatalogState,
}

impl OrderWizard {
    pub fn new() -> Self { Self::default() }

    /// A wizard whose catalog is already available, e.g. the next order in a session.
    pub fn with_catalog(catalog: Arc<Catalog>) -> Self {
        let mut wizard = Self::new();
        wizard.catalog_loaded(catalog);
        wizard
    }

    pub fn step(&self) -> WizardStep { self.step }
    pub fn draft(&self) -> &DraftOrder { &self.draft }
    pub fn is_loading(&self) -> bool { !matches!(self.catalog, CatalogState::Ready(_)) }

    pub fn catalog(&self) -> Option<&Arc<Catalog>> {
        match &self.catalog {
            CatalogState::Ready(catalog) => Some(catalog),
            _ => None,
        }
    }

    /// Marks a catalog fetch as outstanding. Returns `false` when a fetch was
    /// already issued, in which case the caller must not start another.
    pub fn begin_catalog_fetch(&mut self) -> bool {
        match self.catalog {
            CatalogState::Idle => {
                self.catalog = CatalogState::Loading;
                true
            }
            _ => false,
        }
    }

    /// Installs the fetched catalog and defaults the draft to its first product type.
    pub fn catalog_loaded(&mut self, catalog: Arc<Catalog>) {
        if self.draft.product_type().is_empty() {
            if let Some(first) = catalog.product_types.first() {
                self.draft = self.draft.apply(DraftUpdate::ProductType(first.slug.clone()), &catalog);
            }
        }
        self.catalog = CatalogState::Ready(catalog);
    }

    /// Applies `update` as one draft replacement. Selections that refer to
    /// option lists are ignored until the catalog has loaded.
    pub fn update(&mut self, update: DraftUpdate) -> bool { self.update_many([update]) }

    /// Applies all `updates` in order and publishes the result as one draft.
    pub fn update_many(&mut self, updates: impl IntoIterator<Item = DraftUpdate>) -> bool {
        let empty = Catalog::default();
        let catalog = self.catalog().map(|c| &**c);
        let mut next = self.draft.clone();
        let mut changed = false;
        for update in updates {
            if catalog.is_none() && references_catalog(&update) {
                continue;
            }
            next = next.apply(update, catalog.unwrap_or(&empty));
            changed = true;
        }
        if changed {
            self.draft = next;
        }
        changed
    }

    /// Whether `next` would move forward from the current step.
    pub fn can_advance(&self) -> bool {
        if self.is_loading() {
            return false;
        }
        match self.step {
            WizardStep::SelectSize => !self.draft.size().is_empty(),
            WizardStep::SelectFlavorFrosting => !self.draft.flavor().is_empty() && !self.draft.frosting().is_empty(),
            WizardStep::SelectToppings => true,
            WizardStep::Finalize => false,
        }
    }

    pub fn can_go_back(&self) -> bool { self.step.previous().is_some() }

    pub fn can_finalize(&self) -> bool {
        !self.is_loading() && self.step == WizardStep::Finalize && self.draft.is_complete()
    }

    pub fn next(&mut self) -> bool {
        match self.step.next() {
            Some(step) if self.can_advance() => {
                tracing::debug!(from = self.step.number(), to = step.number(), "wizard advanced");
                self.step = step;
                true
            }
            _ => false,
        }
    }

    pub fn previous(&mut self) -> bool {
        match self.step.previous() {
            Some(step) => {
                tracing::debug!(from = self.step.number(), to = step.number(), "wizard went back");
                self.step = step;
                true
            }
            None => false,
        }
    }

    /// Submits the draft to `cart` and resets this wizard for a new order.
    /// Does nothing unless [`can_finalize`](Self::can_finalize) holds.
    pub fn finalize<S: CartStorage>(&mut self, cart: &mut CartStore<S>) -> Option<CartLineItem> {
        if !self.can_finalize() {
            return None;
        }
        let item = self.draft.to_line_item();
        cart.add(item.clone());
        let catalog = self.catalog().cloned()?;
        *self = Self::with_catalog(catalog);
        Some(item)
    }
}

fn references_catalog(update: &DraftUpdate) -> bool {
    !matches!(update, DraftUpdate::Message(_) | DraftUpdate::ImageUrl(_) | DraftUpdate::Quantity(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::domain::value_objects::Money;
    use crate::storage::MemoryStorage;

    fn ready() -> OrderWizard { OrderWizard::with_catalog(Arc::new(StaticCatalog::bakery().snapshot())) }

    fn at_finalize() -> OrderWizard {
        let mut wizard = ready();
        wizard.update(DraftUpdate::Size("6-inch".into()));
        wizard.next();
        wizard.update_many([DraftUpdate::Flavor("vanilla".into()), DraftUpdate::Frosting("buttercream".into())]);
        wizard.next();
        wizard.update(DraftUpdate::Toppings(vec!["sprinkles".into(), "fondant-flowers".into()]));
        wizard.next();
        wizard
    }

    #[test]
    fn test_defaults_to_first_product_type() {
        let wizard = ready();
        assert_eq!(wizard.step(), WizardStep::SelectSize);
        assert_eq!(wizard.draft().product_type(), "cake");
        assert_eq!(wizard.draft().name(), "Cake");
    }

    #[test]
    fn test_next_guards() {
        let mut wizard = ready();
        assert!(!wizard.can_advance());
        assert!(!wizard.next());
        assert_eq!(wizard.step(), WizardStep::SelectSize);

        wizard.update(DraftUpdate::Size("6-inch".into()));
        assert!(wizard.can_advance());
        assert!(wizard.next());
        assert_eq!(wizard.step(), WizardStep::SelectFlavorFrosting);

        wizard.update(DraftUpdate::Flavor("chocolate".into()));
        assert!(!wizard.can_advance());
        assert!(!wizard.next());
        wizard.update(DraftUpdate::Frosting("chocolate-ganache".into()));
        assert!(wizard.next());
        assert_eq!(wizard.step(), WizardStep::SelectToppings);

        // toppings are optional
        assert!(wizard.next());
        assert_eq!(wizard.step(), WizardStep::Finalize);
        assert!(!wizard.can_advance());
        assert!(!wizard.next());
        assert_eq!(wizard.step(), WizardStep::Finalize);
    }

    #[test]
    fn test_previous_keeps_entered_data() {
        let mut wizard = at_finalize();
        let draft = wizard.draft().clone();
        assert!(wizard.previous());
        assert!(wizard.previous());
        assert!(wizard.previous());
        assert_eq!(wizard.step(), WizardStep::SelectSize);
        assert!(!wizard.can_go_back());
        assert!(!wizard.previous());
        assert_eq!(wizard.draft(), &draft);
    }

    #[test]
    fn test_type_switch_keeps_step() {
        let mut wizard = at_finalize();
        wizard.update(DraftUpdate::ProductType("cupcake".into()));
        assert_eq!(wizard.step(), WizardStep::Finalize);
        assert_eq!(wizard.draft().size(), "");
        assert!(!wizard.can_finalize());
    }

    #[test]
    fn test_finalize_adds_to_cart_and_starts_over() {
        let mut cart = CartStore::open(MemoryStorage::new());
        let mut wizard = at_finalize();
        wizard.update(DraftUpdate::Quantity(2));
        let draft_id = wizard.draft().id().to_string();

        let item = wizard.finalize(&mut cart).unwrap();
        assert_eq!(item.id, draft_id);
        assert_eq!(item.price, Money::from_cents(3600));
        assert_eq!(cart.total(), Money::from_cents(7200));

        assert_eq!(wizard.step(), WizardStep::SelectSize);
        assert_ne!(wizard.draft().id(), draft_id);
        assert!(!wizard.is_loading());
    }

    #[test]
    fn test_same_draft_twice_merges_in_cart() {
        let mut cart = CartStore::open(MemoryStorage::new());
        let wizard = at_finalize();
        let mut first = wizard.clone();
        first.update(DraftUpdate::Quantity(2));
        first.finalize(&mut cart).unwrap();
        let mut second = wizard.clone();
        second.update(DraftUpdate::Quantity(1));
        second.finalize(&mut cart).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total(), Money::from_cents(10800));
    }

    #[test]
    fn test_finalize_before_last_step_is_noop() {
        let mut cart = CartStore::open(MemoryStorage::new());
        let mut wizard = ready();
        wizard.update(DraftUpdate::Size("6-inch".into()));
        assert!(wizard.finalize(&mut cart).is_none());
        assert!(cart.is_empty());
        assert_eq!(wizard.draft().size(), "6-inch");
    }

    #[test]
    fn test_loading_blocks_selections_and_advancing() {
        let mut wizard = OrderWizard::new();
        assert!(wizard.begin_catalog_fetch());
        assert!(!wizard.begin_catalog_fetch());
        assert!(wizard.is_loading());

        assert!(!wizard.update(DraftUpdate::Size("6-inch".into())));
        assert!(wizard.update(DraftUpdate::Quantity(3)));
        assert_eq!(wizard.draft().size(), "");
        assert!(!wizard.next());

        wizard.catalog_loaded(Arc::new(StaticCatalog::bakery().snapshot()));
        assert!(!wizard.begin_catalog_fetch());
        assert!(wizard.update(DraftUpdate::Size("6-inch".into())));
        assert_eq!(wizard.draft().quantity().value(), 3);
        assert!(wizard.next());
    }

    #[test]
    fn test_empty_catalog_is_usable() {
        let mut wizard = OrderWizard::with_catalog(Arc::new(Catalog::default()));
        assert!(!wizard.is_loading());
        assert_eq!(wizard.draft().product_type(), "");
        wizard.update(DraftUpdate::Size("6-inch".into()));
        assert!(wizard.draft().price().is_zero());
    }
}
