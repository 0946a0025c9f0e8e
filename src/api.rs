//! HTTP surface for one shopping session.

use std::sync::Arc;

use axum::{extract::{Path, State}, http::StatusCode, routing::{get, post, put}, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::{Validate, ValidationError};

use crate::catalog::{self, CatalogProvider};
use crate::checkout::{self, CheckoutError, CheckoutGateway, FulfillmentDetails, OrderConfirmation};
use crate::domain::aggregates::{CartLineItem, CartStore, DraftOrder, DraftUpdate, OrderWizard, WizardStep};
use crate::domain::catalog::Catalog;
use crate::domain::options::{self, FrostingOption, SizeOption, ToppingOption};
use crate::domain::preview::OrderPreview;
use crate::domain::value_objects::Money;
use crate::storage::{CartStorage, MemoryStorage};

pub type SessionCart = CartStore<Box<dyn CartStorage + Send>>;

pub struct Session {
    pub wizard: OrderWizard,
    pub cart: SessionCart,
}

#[derive(Clone)]
pub struct AppState {
    session: Arc<Mutex<Session>>,
    gateway: Arc<dyn CheckoutGateway>,
}

impl AppState {
    pub fn new(wizard: OrderWizard, cart: SessionCart, gateway: Arc<dyn CheckoutGateway>) -> Self {
        Self { session: Arc::new(Mutex::new(Session { wizard, cart })), gateway }
    }

    /// Writes the cart a final time and detaches its storage. Later cart
    /// changes in this process are kept in memory only.
    pub async fn close_cart(&self) {
        let mut session = self.session.lock().await;
        let detached: SessionCart = CartStore::open(Box::new(MemoryStorage::new()));
        std::mem::replace(&mut session.cart, detached).close();
    }
}

/// Starts the session's catalog fetch in the background. Returns `false`
/// when a fetch was already issued.
pub async fn spawn_catalog_fetch(state: &AppState, provider: Arc<dyn CatalogProvider>) -> bool {
    if !state.session.lock().await.wizard.begin_catalog_fetch() {
        return false;
    }
    let session = state.session.clone();
    tokio::spawn(async move {
        let catalog = Arc::new(catalog::load(provider.as_ref()).await);
        session.lock().await.wizard.catalog_loaded(catalog);
    });
    true
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "bakery-storefront"})) }))
        .route("/api/v1/catalog", get(get_catalog))
        .route("/api/v1/order", get(get_order).patch(patch_order))
        .route("/api/v1/order/next", post(next_step))
        .route("/api/v1/order/previous", post(previous_step))
        .route("/api/v1/order/finalize", post(finalize_order))
        .route("/api/v1/cart", get(get_cart).delete(clear_cart))
        .route("/api/v1/cart/items/:id", put(update_cart_item).delete(remove_cart_item))
        .route("/api/v1/checkout", post(checkout_cart))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct WizardView {
    pub step: WizardStep,
    pub step_number: u8,
    pub step_title: &'static str,
    pub loading: bool,
    pub can_advance: bool,
    pub can_go_back: bool,
    pub can_finalize: bool,
    pub draft: DraftOrder,
    pub preview: OrderPreview,
    pub sizes: Vec<SizeOption>,
    pub frostings: Vec<FrostingOption>,
    pub toppings: Vec<ToppingOption>,
}

impl WizardView {
    fn of(wizard: &OrderWizard) -> Self {
        let empty = Catalog::default();
        let catalog = wizard.catalog().map(|c| &**c).unwrap_or(&empty);
        let draft = wizard.draft();
        Self {
            step: wizard.step(), step_number: wizard.step().number(), step_title: wizard.step().title(),
            loading: wizard.is_loading(), can_advance: wizard.can_advance(), can_go_back: wizard.can_go_back(),
            can_finalize: wizard.can_finalize(), draft: draft.clone(), preview: OrderPreview::project(draft, catalog),
            sizes: options::size_options(draft, catalog), frostings: options::frosting_options(draft, catalog),
            toppings: options::topping_options(draft, catalog),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub item: CartLineItem,
    #[serde(rename = "lineTotal")]
    pub line_total: Money,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: u32,
    pub total: Money,
    pub total_label: String,
}

impl CartView {
    fn of(cart: &SessionCart) -> Self {
        Self {
            items: cart.items().iter().map(|i| CartLineView { item: i.clone(), line_total: i.line_total() }).collect(),
            item_count: cart.item_count(),
            total: cart.total(),
            total_label: cart.total().to_string(),
        }
    }
}

/// Partial draft edit. Fields are applied in declaration order as one update,
/// so a new type and a size of that type can arrive together.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DraftPatch {
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub size: Option<String>,
    pub flavor: Option<String>,
    pub frosting: Option<String>,
    pub toppings: Option<Vec<String>>,
    pub toggle_topping: Option<String>,
    #[validate(length(max = 30))]
    pub message: Option<String>,
    #[validate(custom = "validate_image_url")]
    pub image_url: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub quantity: Option<i64>,
}

fn validate_image_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() || validator::validate_url(url) { Ok(()) } else { Err(ValidationError::new("url")) }
}

impl DraftPatch {
    fn into_updates(self) -> Vec<DraftUpdate> {
        let mut updates = Vec::new();
        if let Some(v) = self.product_type { updates.push(DraftUpdate::ProductType(v)); }
        if let Some(v) = self.size { updates.push(DraftUpdate::Size(v)); }
        if let Some(v) = self.flavor { updates.push(DraftUpdate::Flavor(v)); }
        if let Some(v) = self.frosting { updates.push(DraftUpdate::Frosting(v)); }
        if let Some(v) = self.toppings { updates.push(DraftUpdate::Toppings(v)); }
        if let Some(v) = self.toggle_topping { updates.push(DraftUpdate::ToggleTopping(v)); }
        if let Some(v) = self.message { updates.push(DraftUpdate::Message(Some(v))); }
        if let Some(v) = self.image_url { updates.push(DraftUpdate::ImageUrl(Some(v))); }
        if let Some(v) = self.quantity { updates.push(DraftUpdate::Quantity(v)); }
        updates
    }
}

#[derive(Debug, Deserialize)] pub struct QuantityRequest { pub quantity: i64 }

async fn get_catalog(State(s): State<AppState>) -> Json<Catalog> {
    let session = s.session.lock().await;
    Json(session.wizard.catalog().map(|c| Catalog::clone(c)).unwrap_or_default())
}

async fn get_order(State(s): State<AppState>) -> Json<WizardView> {
    Json(WizardView::of(&s.session.lock().await.wizard))
}

async fn patch_order(State(s): State<AppState>, Json(patch): Json<DraftPatch>) -> Result<Json<WizardView>, (StatusCode, String)> {
    patch.validate().map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    let mut session = s.session.lock().await;
    session.wizard.update_many(patch.into_updates());
    Ok(Json(WizardView::of(&session.wizard)))
}

async fn next_step(State(s): State<AppState>) -> Json<WizardView> {
    let mut session = s.session.lock().await;
    session.wizard.next();
    Json(WizardView::of(&session.wizard))
}

async fn previous_step(State(s): State<AppState>) -> Json<WizardView> {
    let mut session = s.session.lock().await;
    session.wizard.previous();
    Json(WizardView::of(&session.wizard))
}

async fn finalize_order(State(s): State<AppState>) -> Result<(StatusCode, Json<CartView>), (StatusCode, String)> {
    let mut session = s.session.lock().await;
    let Session { wizard, cart } = &mut *session;
    wizard.finalize(cart).ok_or((StatusCode::CONFLICT, "order is not ready for the cart".to_string()))?;
    Ok((StatusCode::CREATED, Json(CartView::of(cart))))
}

async fn get_cart(State(s): State<AppState>) -> Json<CartView> {
    Json(CartView::of(&s.session.lock().await.cart))
}

async fn clear_cart(State(s): State<AppState>) -> Json<CartView> {
    let mut session = s.session.lock().await;
    session.cart.clear();
    Json(CartView::of(&session.cart))
}

async fn update_cart_item(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<QuantityRequest>) -> Json<CartView> {
    let mut session = s.session.lock().await;
    session.cart.update_quantity(&id, r.quantity);
    Json(CartView::of(&session.cart))
}

async fn remove_cart_item(State(s): State<AppState>, Path(id): Path<String>) -> Json<CartView> {
    let mut session = s.session.lock().await;
    session.cart.remove(&id);
    Json(CartView::of(&session.cart))
}

async fn checkout_cart(State(s): State<AppState>, Json(details): Json<FulfillmentDetails>) -> Result<Json<OrderConfirmation>, (StatusCode, String)> {
    let mut session = s.session.lock().await;
    let today = Utc::now().date_naive();
    checkout::checkout(&mut session.cart, s.gateway.as_ref(), details, today)
        .await
        .map(Json)
        .map_err(|e| (checkout_status(&e), e.to_string()))
}

fn checkout_status(e: &CheckoutError) -> StatusCode {
    match e {
        CheckoutError::EmptyCart => StatusCode::CONFLICT,
        CheckoutError::InvalidDetails(_) | CheckoutError::TooSoon { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CheckoutError::Submission(_) => StatusCode::BAD_GATEWAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::checkout::{is_order_number, StubGateway};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Duration;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state() -> AppState {
        let wizard = OrderWizard::with_catalog(Arc::new(StaticCatalog::bakery().snapshot()));
        let cart: SessionCart = CartStore::open(Box::new(MemoryStorage::new()));
        AppState::new(wizard, cart, Arc::new(StubGateway))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri).header("content-type", "application/json");
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(&router(state()), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_order_to_checkout() {
        let app = router(state());

        let (_, view) = call(&app, "POST", "/api/v1/order/next", None).await;
        assert_eq!(view["step_number"], 1);
        assert_eq!(view["can_advance"], false);

        let (status, view) = call(&app, "PATCH", "/api/v1/order", Some(json!({"size": "6-inch"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["can_advance"], true);
        call(&app, "POST", "/api/v1/order/next", None).await;

        let (_, view) = call(&app, "PATCH", "/api/v1/order", Some(json!({"flavor": "red-velvet"}))).await;
        assert_eq!(view["can_advance"], false);
        let recommended: Vec<&str> = view["frostings"].as_array().unwrap().iter()
            .filter(|f| f["recommended"] == true).map(|f| f["slug"].as_str().unwrap()).collect();
        assert_eq!(recommended, vec!["cream-cheese"]);
        call(&app, "PATCH", "/api/v1/order", Some(json!({"frosting": "cream-cheese"}))).await;
        call(&app, "POST", "/api/v1/order/next", None).await;

        call(&app, "PATCH", "/api/v1/order", Some(json!({"toppings": ["sprinkles", "fondant-flowers"]}))).await;
        let (_, view) = call(&app, "POST", "/api/v1/order/next", None).await;
        assert_eq!(view["step"], "finalize");
        let (_, view) = call(&app, "PATCH", "/api/v1/order", Some(json!({"message": "Happy Birthday", "quantity": 2}))).await;
        assert_eq!(view["preview"]["line_total"], "72.00");
        assert_eq!(view["can_finalize"], true);

        let (status, cart) = call(&app, "POST", "/api/v1/order/finalize", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(cart["total_label"], "$72.00");
        assert_eq!(cart["items"][0]["type"], "cake");
        assert_eq!(cart["items"][0]["lineTotal"], "72.00");

        let (_, view) = call(&app, "GET", "/api/v1/order", None).await;
        assert_eq!(view["step_number"], 1);

        let date = (Utc::now().date_naive() + Duration::days(3)).to_string();
        let (status, confirmation) = call(&app, "POST", "/api/v1/checkout", Some(json!({"method": "pickup", "date": date}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(is_order_number(confirmation["order_number"].as_str().unwrap()));

        let (_, cart) = call(&app, "GET", "/api/v1/cart", None).await;
        assert_eq!(cart["items"].as_array().unwrap().len(), 0);
        assert_eq!(cart["total_label"], "$0.00");
    }

    #[tokio::test]
    async fn test_patch_validation() {
        let app = router(state());
        let long = "x".repeat(31);
        let (status, _) = call(&app, "PATCH", "/api/v1/order", Some(json!({"message": long}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (status, _) = call(&app, "PATCH", "/api/v1/order", Some(json!({"quantity": 11}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (status, _) = call(&app, "PATCH", "/api/v1/order", Some(json!({"imageUrl": "not a url"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (status, view) = call(&app, "PATCH", "/api/v1/order", Some(json!({"imageUrl": "https://example.com/cake.png"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["draft"]["image_url"], "https://example.com/cake.png");
    }

    #[tokio::test]
    async fn test_type_and_size_in_one_patch() {
        let app = router(state());
        let (_, view) = call(&app, "PATCH", "/api/v1/order", Some(json!({"type": "cupcake", "size": "12-count"}))).await;
        assert_eq!(view["draft"]["size"], "12-count");
        assert_eq!(view["draft"]["price"], "32.00");
        assert_eq!(view["sizes"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_finalize_too_early_conflicts() {
        let app = router(state());
        let (status, _) = call(&app, "POST", "/api/v1/order/finalize", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_cart_item_updates() {
        let state = state();
        {
            let mut session = state.session.lock().await;
            let catalog = session.wizard.catalog().cloned().unwrap();
            let item = DraftOrder::new()
                .apply(DraftUpdate::ProductType("cake".into()), &catalog)
                .apply(DraftUpdate::Size("8-inch".into()), &catalog)
                .to_line_item();
            session.cart.add(item);
        }
        let id = state.session.lock().await.cart.items()[0].id.clone();
        let app = router(state);

        let (_, cart) = call(&app, "PUT", &format!("/api/v1/cart/items/{id}"), Some(json!({"quantity": 3}))).await;
        assert_eq!(cart["item_count"], 3);
        assert_eq!(cart["total_label"], "$105.00");
        let (_, cart) = call(&app, "PUT", "/api/v1/cart/items/unknown", Some(json!({"quantity": 3}))).await;
        assert_eq!(cart["item_count"], 3);
        let (_, cart) = call(&app, "PUT", &format!("/api/v1/cart/items/{id}"), Some(json!({"quantity": 0}))).await;
        assert_eq!(cart["item_count"], 0);
    }

    #[tokio::test]
    async fn test_close_cart_flushes_storage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cart.json");
        let cart: SessionCart = CartStore::open(Box::new(crate::storage::JsonFileStorage::new(&path)));
        let state = AppState::new(OrderWizard::with_catalog(Arc::new(StaticCatalog::bakery().snapshot())), cart, Arc::new(StubGateway));
        let app = router(state.clone());
        call(&app, "PATCH", "/api/v1/order", Some(json!({"size": "10-inch", "flavor": "lemon", "frosting": "fondant"}))).await;
        for _ in 0..3 {
            call(&app, "POST", "/api/v1/order/next", None).await;
        }
        let (status, _) = call(&app, "POST", "/api/v1/order/finalize", None).await;
        assert_eq!(status, StatusCode::CREATED);

        state.close_cart().await;
        let restored = CartStore::open(crate::storage::JsonFileStorage::new(&path));
        assert_eq!(restored.item_count(), 1);
        assert_eq!(restored.total().to_string(), "$45.00");
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let app = router(state());
        let date = (Utc::now().date_naive() + Duration::days(5)).to_string();
        let (status, _) = call(&app, "POST", "/api/v1/checkout", Some(json!({"date": date}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_catalog_fetch_runs_once() {
        let wizard = OrderWizard::new();
        let cart: SessionCart = CartStore::open(Box::new(MemoryStorage::new()));
        let state = AppState::new(wizard, cart, Arc::new(StubGateway));
        let provider: Arc<dyn CatalogProvider> = Arc::new(StaticCatalog::bakery());
        assert!(spawn_catalog_fetch(&state, provider.clone()).await);
        assert!(!spawn_catalog_fetch(&state, provider).await);

        for _ in 0..100 {
            if !state.session.lock().await.wizard.is_loading() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let (_, catalog) = call(&router(state), "GET", "/api/v1/catalog", None).await;
        assert_eq!(catalog["product_types"].as_array().unwrap().len(), 2);
    }
}
