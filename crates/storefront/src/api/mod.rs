//! REST client for the cart-link endpoints.
//!
//! # Endpoints
//!
//! All paths are relative to the configured base URL:
//!
//! - `GET  /api/cart/{token}` - validate a cart link
//! - `GET  /api/cart/{token}/products` - catalogue for the link
//! - `GET  /api/cart/{token}/pending-order` - order awaiting confirmation
//! - `POST /api/cart/{token}/complete` - submit the cart
//! - `GET  /api/cart/{token}/status` - used/expired status
//!
//! Error bodies follow the FastAPI convention `{"detail": "..."}`.

mod types;

pub use types::CartStatus;

use std::sync::Arc;

use cartlink_core::error_body::{error_message, truncate};
use cartlink_core::{
    CheckoutRequest, CheckoutResponse, ImageResolver, PendingOrderResponse, Product, Session,
    SessionToken,
};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;

/// Maximum number of body characters written to logs.
const LOG_BODY_LIMIT: usize = 500;

/// Errors that can occur when calling the cart endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the token (HTTP 400).
    #[error("Invalid cart session: {0}")]
    InvalidSession(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build a URL or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Client for the cart-link endpoints.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct CartApiClient {
    inner: Arc<CartApiClientInner>,
}

struct CartApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    images: ImageResolver,
}

impl CartApiClient {
    /// Create a new cart API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(CartApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                images: config.image_resolver(),
            }),
        })
    }

    /// Resolve a product image path to a fetchable URL or the placeholder.
    #[must_use]
    pub fn image_url(&self, path: Option<&str>) -> String {
        self.inner.images.url_for(path)
    }

    /// Build `{base}/api/cart/{token}/{tail...}`.
    fn endpoint(&self, token: &SessionToken, tail: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Parse("base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["api", "cart", token.expose()])
            .extend(tail);
        Ok(url)
    }

    /// Execute a GET request.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.inner.client.get(url).send().await?;
        handle_response(response).await
    }

    /// Execute a POST request with a JSON body.
    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.inner.client.post(url).json(body).send().await?;
        handle_response(response).await
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Validate a cart-link token.
    ///
    /// An expired or used token is not an error: the backend answers with
    /// `valid: false` and a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self, token), fields(token = %token))]
    pub async fn validate_session(&self, token: &SessionToken) -> Result<Session, ApiError> {
        let session: Session = self.get(self.endpoint(token, &[])?).await?;
        debug!(valid = session.valid, "Validated cart session");
        Ok(session)
    }

    /// Get the products offered to this cart link.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidSession` if the token is no longer valid, or
    /// another error if the request fails.
    #[instrument(skip(self, token), fields(token = %token))]
    pub async fn get_products(&self, token: &SessionToken) -> Result<Vec<Product>, ApiError> {
        let products: Vec<Product> = self.get(self.endpoint(token, &["products"])?).await?;
        debug!(count = products.len(), "Fetched cart catalogue");
        Ok(products)
    }

    /// Get the pending order linked to this cart link, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self, token), fields(token = %token))]
    pub async fn get_pending_order(
        &self,
        token: &SessionToken,
    ) -> Result<PendingOrderResponse, ApiError> {
        self.get(self.endpoint(token, &["pending-order"])?).await
    }

    /// Submit the cart and create (or replace) the pending order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidSession` if the token is no longer valid, or
    /// another error if the request fails.
    #[instrument(
        skip(self, token, request),
        fields(token = %token, lines = request.products.len(), total = %request.total)
    )]
    pub async fn complete_cart(
        &self,
        token: &SessionToken,
        request: &CheckoutRequest,
    ) -> Result<CheckoutResponse, ApiError> {
        let response: CheckoutResponse =
            self.post(self.endpoint(token, &["complete"])?, request).await?;
        debug!(
            success = response.success,
            order_id = ?response.order_id,
            "Cart completion answered"
        );
        Ok(response)
    }

    /// Check whether a cart link has been used or has expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self, token), fields(token = %token))]
    pub async fn cart_status(&self, token: &SessionToken) -> Result<CartStatus, ApiError> {
        self.get(self.endpoint(token, &["status"])?).await
    }
}

impl std::fmt::Debug for CartApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Response Handling
// =============================================================================

/// Map a response to `T` or an [`ApiError`].
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(ApiError::RateLimited(retry_after));
    }

    // Read as text first for better error diagnostics
    let body = response.text().await?;

    if !status.is_success() {
        if status.is_server_error() {
            tracing::error!(
                status = %status,
                body = %truncate(&body, LOG_BODY_LIMIT),
                "Cart API returned server error"
            );
        } else {
            tracing::warn!(
                status = %status,
                body = %truncate(&body, LOG_BODY_LIMIT),
                "Cart API rejected request"
            );
        }

        let message = error_message(&body);
        return Err(match status {
            StatusCode::BAD_REQUEST => ApiError::InvalidSession(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            other => ApiError::Api {
                status: other.as_u16(),
                message,
            },
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %truncate(&body, LOG_BODY_LIMIT),
            "Failed to parse cart API response"
        );
        ApiError::Parse(e.to_string())
    })
}
