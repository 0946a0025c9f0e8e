//! Domain layer: catalog entities, pricing, the order wizard and the cart.
pub mod aggregates;
pub mod catalog;
pub mod options;
pub mod preview;
pub mod pricing;
pub mod value_objects;
