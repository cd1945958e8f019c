//! Integration test support for cartlink.
//!
//! [`StubBackend`] serves the cart-link and dashboard endpoints from memory
//! on an ephemeral port, so the real clients can be driven end to end
//! without a database or the chat bot behind the real backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartlink-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_api` - Cart-link client against each endpoint
//! - `cart_session` - Open, restore, fill and complete a cart link
//! - `admin_products` - Catalogue management
//! - `admin_orders` - Order management

#![cfg_attr(not(test), forbid(unsafe_code))]

mod cart_routes;
mod dashboard_routes;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use cartlink_admin::{AdminClient, AdminConfig, AdminError};
use cartlink_core::SessionToken;
use cartlink_storefront::{ApiError, CartApiClient, StorefrontConfig};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Customer every stub session belongs to.
pub const CUSTOMER_ID: &str = "c-1";

/// Timestamp stamped on every stub record, naive like the real backend's.
pub const STAMP: &str = "2025-11-12T10:00:00.000123";

/// Shared state behind the stub's handlers.
pub type SharedState = Arc<Mutex<BackendState>>;

/// Error reply in the backend's `{"detail": ...}` shape.
pub(crate) type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub(crate) fn detail(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": message })))
}

pub(crate) fn lock(state: &SharedState) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A product row.
#[derive(Debug, Clone)]
pub struct StubProduct {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub stock: u32,
    pub is_active: bool,
    pub category: Option<String>,
    pub image_path: Option<String>,
}

impl StubProduct {
    /// An active product without category or image.
    #[must_use]
    pub fn new(id: &str, name: &str, price: f64, stock: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            price,
            stock,
            is_active: true,
            category: None,
            image_path: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    #[must_use]
    pub fn with_image(mut self, path: &str) -> Self {
        self.image_path = Some(path.to_string());
        self
    }

    pub(crate) fn catalog_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "description": null,
            "price": self.price,
            "stock": self.stock,
            "category": self.category,
            "sku": null,
            "image_path": self.image_path,
        })
    }

    pub(crate) fn admin_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "description": null,
            "price": self.price,
            "stock": self.stock,
            "category": self.category,
            "sku": null,
            "is_active": self.is_active,
            "image_path": self.image_path,
            "created_at": STAMP,
            "updated_at": STAMP,
            "in_stock": self.is_active && self.stock > 0,
            "has_image": self.image_path.is_some(),
        })
    }
}

/// A cart-link session row.
#[derive(Debug, Clone, Default)]
pub struct StubSession {
    pub used: bool,
    pub expired: bool,
    /// Order created from this link, if any.
    pub order_id: Option<String>,
}

impl StubSession {
    /// Failure code and message, or `None` when usable.
    pub(crate) const fn failure(&self) -> Option<(&'static str, &'static str)> {
        if self.used {
            Some(("token_used", "Este link ya fue utilizado."))
        } else if self.expired {
            Some(("token_expired", "Este link expiró. Solicita uno nuevo."))
        } else {
            None
        }
    }
}

/// One line of a stub order.
#[derive(Debug, Clone)]
pub struct StubOrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

/// An order row.
#[derive(Debug, Clone)]
pub struct StubOrder {
    pub id: String,
    pub order_number: String,
    pub status: String,
    pub items: Vec<StubOrderItem>,
    pub cancelled: bool,
}

impl StubOrder {
    /// A pending order.
    #[must_use]
    pub fn pending(id: &str, order_number: &str, items: Vec<StubOrderItem>) -> Self {
        Self {
            id: id.to_string(),
            order_number: order_number.to_string(),
            status: "pending".to_string(),
            items,
            cancelled: false,
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.unit_price * f64::from(item.quantity))
            .sum()
    }

    pub(crate) fn pending_json(&self) -> Value {
        json!({
            "id": self.id,
            "order_number": self.order_number,
            "total": self.total(),
            "items": self.items.iter().map(|item| json!({
                "product_id": item.product_id,
                "product_name": item.product_name,
                "quantity": item.quantity,
                "unit_price": item.unit_price,
                "subtotal": item.unit_price * f64::from(item.quantity),
            })).collect::<Vec<_>>(),
        })
    }

    pub(crate) fn admin_json(&self) -> Value {
        json!({
            "id": self.id,
            "order_number": self.order_number,
            "customer_id": CUSTOMER_ID,
            "customer_name": "Lucía",
            "customer_phone": "+5215512345678",
            "status": self.status,
            "subtotal": self.total(),
            "tax": 0.0,
            "shipping_cost": 0.0,
            "total": self.total(),
            "payment_method": "N/A",
            "delivery_address": null,
            "delivery_latitude": null,
            "delivery_longitude": null,
            "delivery_reference": null,
            "items": self.items.iter().enumerate().map(|(n, item)| json!({
                "id": format!("{}-{n}", self.id),
                "product_id": item.product_id,
                "product_name": item.product_name,
                "quantity": item.quantity,
                "unit_price": item.unit_price,
                "subtotal": item.unit_price * f64::from(item.quantity),
            })).collect::<Vec<_>>(),
            "created_at": STAMP,
            "updated_at": STAMP,
            "confirmed_at": null,
            "shipped_at": null,
            "delivered_at": null,
            "cancelled_at": if self.cancelled { Value::from(STAMP) } else { Value::Null },
        })
    }
}

/// An image received by the upload endpoint.
#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

/// Everything the stub knows, plus what it has been sent.
#[derive(Debug, Default)]
pub struct BackendState {
    pub products: Vec<StubProduct>,
    pub sessions: HashMap<String, StubSession>,
    pub orders: Vec<StubOrder>,
    /// Answer the next completion with `success: false` and this message.
    pub decline_next_completion: Option<String>,
    /// Bodies received by `POST /api/cart/{token}/complete`.
    pub completions: Vec<Value>,
    /// `Authorization` header of every dashboard request.
    pub authorizations: Vec<Option<String>>,
    pub uploads: Vec<ReceivedUpload>,
}

impl BackendState {
    #[must_use]
    pub fn with_products(mut self, products: impl IntoIterator<Item = StubProduct>) -> Self {
        self.products.extend(products);
        self
    }

    #[must_use]
    pub fn with_session(mut self, token: &str, session: StubSession) -> Self {
        self.sessions.insert(token.to_string(), session);
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: StubOrder) -> Self {
        self.orders.push(order);
        self
    }

    pub(crate) fn product(&self, id: &str) -> Option<&StubProduct> {
        self.products.iter().find(|p| p.id == id)
    }

    pub(crate) fn product_mut(&mut self, id: &str) -> Option<&mut StubProduct> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    pub(crate) fn order_mut(&mut self, id: &str) -> Option<&mut StubOrder> {
        self.orders.iter_mut().find(|o| o.id == id)
    }
}

/// In-process backend bound to `127.0.0.1` on an ephemeral port.
///
/// The server task is aborted when the stub is dropped.
pub struct StubBackend {
    addr: SocketAddr,
    state: SharedState,
    server: JoinHandle<()>,
}

impl StubBackend {
    /// Start serving `state`.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot be bound.
    pub async fn start(state: BackendState) -> std::io::Result<Self> {
        let state: SharedState = Arc::new(Mutex::new(state));

        let app = Router::new()
            .merge(cart_routes::router())
            .merge(dashboard_routes::router(state.clone()))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Base URL of the stub.
    ///
    /// # Panics
    ///
    /// Never in practice: a socket address always forms a valid URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("socket address is a valid URL host")
    }

    /// Lock the stub's state for inspection or changes.
    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        lock(&self.state)
    }

    /// Cart-link client pointed at the stub.
    ///
    /// # Errors
    ///
    /// Returns error if the client fails to build.
    pub fn storefront_client(&self) -> Result<CartApiClient, ApiError> {
        CartApiClient::new(&StorefrontConfig::new(self.base_url()))
    }

    /// Dashboard client pointed at the stub, with an optional API key.
    ///
    /// # Errors
    ///
    /// Returns error if the client fails to build.
    pub fn admin_client(&self, api_key: Option<&str>) -> Result<AdminClient, AdminError> {
        let mut config = AdminConfig::new(self.base_url());
        config.api_key = api_key.map(|key| SecretString::from(key.to_string()));
        AdminClient::new(&config)
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Parse a token known to be valid.
///
/// # Panics
///
/// Panics if `raw` is not a valid token.
#[must_use]
pub fn token(raw: &str) -> SessionToken {
    SessionToken::parse(raw).expect("valid test token")
}
