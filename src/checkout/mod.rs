//! Checkout flow
//!
//! Hands the cart to a [`CheckoutGateway`] together with the fulfillment
//! details collected on the cart page. The cart is cleared only after the
//! gateway accepts the order; any failure leaves it intact for a retry.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::aggregates::{CartLineItem, CartStore};
use crate::domain::value_objects::Money;
use crate::storage::CartStorage;

/// Orders need this many days of lead time.
pub const MIN_LEAD_DAYS: i64 = 2;
pub const ORDER_NUMBER_PREFIX: &str = "ORD";

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("invalid fulfillment details: {0}")]
    InvalidDetails(#[from] ValidationErrors),

    #[error("earliest available date is {earliest}")]
    TooSoon { earliest: NaiveDate },

    #[error("order submission failed: {0}")]
    Submission(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentMethod {
    #[default]
    Pickup,
    Delivery,
}

impl FulfillmentMethod {
    pub fn fee(&self) -> Money {
        match self {
            FulfillmentMethod::Pickup => Money::zero(),
            FulfillmentMethod::Delivery => Money::new(Decimal::TEN),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_address"))]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentDetails {
    #[serde(default)]
    pub method: FulfillmentMethod,
    #[validate(length(min = 1, max = 500))]
    pub address: Option<String>,
    pub date: NaiveDate,
    #[validate(length(max = 1000))]
    pub instructions: Option<String>,
}

fn validate_address(details: &FulfillmentDetails) -> Result<(), ValidationError> {
    let has_address = details.address.as_deref().is_some_and(|a| !a.trim().is_empty());
    if details.method == FulfillmentMethod::Delivery && !has_address {
        return Err(ValidationError::new("delivery_requires_address"));
    }
    Ok(())
}

impl FulfillmentDetails {
    pub fn earliest_date(today: NaiveDate) -> NaiveDate { today + Duration::days(MIN_LEAD_DAYS) }

    /// Field rules plus the lead-time rule relative to `today`.
    pub fn check(&self, today: NaiveDate) -> Result<(), CheckoutError> {
        self.validate()?;
        let earliest = Self::earliest_date(today);
        if self.date < earliest {
            return Err(CheckoutError::TooSoon { earliest });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OrderSummary {
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

impl OrderSummary {
    pub fn new(subtotal: Money, method: FulfillmentMethod) -> Self {
        let delivery_fee = method.fee();
        Self { subtotal, delivery_fee, total: subtotal.add(&delivery_fee) }
    }
}

/// What the gateway receives.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderSubmission {
    pub items: Vec<CartLineItem>,
    pub details: FulfillmentDetails,
    pub summary: OrderSummary,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderConfirmation {
    pub order_number: String,
    pub summary: OrderSummary,
    pub placed_at: DateTime<Utc>,
}

#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Returns the order number on success.
    async fn submit(&self, order: &OrderSubmission) -> Result<String, CheckoutError>;
}

/// Accepts every order and hands back a random `ORD` number; nothing is stored or charged.
#[derive(Clone, Copy, Debug, Default)]
pub struct StubGateway;

#[async_trait]
impl CheckoutGateway for StubGateway {
    async fn submit(&self, order: &OrderSubmission) -> Result<String, CheckoutError> {
        let number = rand::thread_rng().gen_range(100_000..=999_999);
        let order_number = format!("{}{}", ORDER_NUMBER_PREFIX, number);
        tracing::info!(%order_number, items = order.items.len(), total = %order.summary.total, "order accepted");
        Ok(order_number)
    }
}

/// `ORD` followed by exactly six digits.
pub fn is_order_number(value: &str) -> bool {
    value
        .strip_prefix(ORDER_NUMBER_PREFIX)
        .is_some_and(|digits| digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_digit()))
}

pub async fn checkout<S: CartStorage>(
    cart: &mut CartStore<S>,
    gateway: &dyn CheckoutGateway,
    details: FulfillmentDetails,
    today: NaiveDate,
) -> Result<OrderConfirmation, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    details.check(today)?;

    let summary = OrderSummary::new(cart.total(), details.method);
    let submission = OrderSubmission { items: cart.items().to_vec(), details, summary };
    let order_number = gateway.submit(&submission).await.map_err(|e| {
        tracing::warn!(error = %e, "checkout failed, cart kept for retry");
        e
    })?;

    cart.clear();
    Ok(OrderConfirmation { order_number, summary, placed_at: Utc::now() })
}
