//! Cart session flow.
//!
//! A [`CartSession`] is everything one customer needs while a cart link is
//! open: the validated [`SessionHolder`], the catalogue served for the link
//! and the [`Cart`] being built. It is created per link and passed around
//! explicitly.
//!
//! # Example
//!
//! ```rust,ignore
//! let client = CartApiClient::new(&StorefrontConfig::from_env()?)?;
//! let mut session = CartSession::open(client, token).await?;
//!
//! if session.holder().is_valid() {
//!     session.add_product(&product_id, 2);
//!     let response = session.checkout().await?;
//! }
//! ```

use std::sync::Arc;

use cartlink_core::{
    Cart, CheckoutResponse, PendingOrder, Product, ProductId, Session, SessionHolder,
    SessionToken,
};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiError, CartApiClient};

/// Errors that can occur when submitting a cart.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The session is not valid for checkout.
    #[error("Cart session not ready: {0}")]
    NotReady(String),

    /// There is nothing to submit.
    #[error("Cart is empty")]
    EmptyCart,

    /// The completion request failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// State for one open cart link.
#[derive(Debug)]
pub struct CartSession {
    client: CartApiClient,
    token: SessionToken,
    holder: SessionHolder,
    session: Option<Session>,
    catalog: Vec<Arc<Product>>,
    pending_order: Option<PendingOrder>,
    cart: Cart,
}

impl CartSession {
    /// Create an unvalidated session for `token`.
    #[must_use]
    pub fn new(client: CartApiClient, token: SessionToken) -> Self {
        let mut holder = SessionHolder::new();
        holder.set_token(token.clone());

        Self {
            client,
            token,
            holder,
            session: None,
            catalog: Vec::new(),
            pending_order: None,
            cart: Cart::new(),
        }
    }

    /// Validate `token` and, if valid, load the catalogue and any pending
    /// order into the cart.
    ///
    /// An invalid link is not an error; inspect [`CartSession::holder`].
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the catalogue request fails.
    #[instrument(skip(client, token), fields(token = %token))]
    pub async fn open(client: CartApiClient, token: SessionToken) -> Result<Self, ApiError> {
        let mut session = Self::new(client, token);

        session.validate().await?;
        if !session.holder.is_valid() {
            info!(
                error = session.holder.error().unwrap_or_default(),
                "Cart link is not usable"
            );
            return Ok(session);
        }

        session.refresh_catalog().await?;
        session.restore_pending_order().await;

        Ok(session)
    }

    /// Re-validate the token, replacing the holder's validity and error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the holder records it too.
    pub async fn validate(&mut self) -> Result<&Session, ApiError> {
        match self.client.validate_session(&self.token).await {
            Ok(session) => {
                self.holder.apply(&session);
                Ok(self.session.insert(session))
            }
            Err(e) => {
                self.holder.set_valid(false);
                self.holder.set_error(Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Re-fetch the catalogue. Returns the number of products offered.
    ///
    /// Cart lines keep the product snapshot they were added with until the
    /// product is added again.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the holder records it too.
    pub async fn refresh_catalog(&mut self) -> Result<usize, ApiError> {
        match self.client.get_products(&self.token).await {
            Ok(products) => {
                self.catalog = products.into_iter().map(Arc::new).collect();
                Ok(self.catalog.len())
            }
            Err(e) => {
                self.holder.set_error(Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Prefill the cart from the pending order, if there is one.
    ///
    /// Failures are logged and leave the cart untouched.
    async fn restore_pending_order(&mut self) {
        let pending = match self.client.get_pending_order(&self.token).await {
            Ok(response) => response.into_order(),
            Err(e) => {
                warn!(error = %e, "Could not load pending order");
                return;
            }
        };

        if let Some(order) = pending {
            let restored = self.cart.restore_pending(&order, &self.catalog);
            info!(
                order_number = %order.order_number,
                restored,
                items = order.items.len(),
                "Restored pending order into cart"
            );
            self.pending_order = Some(order);
        }
    }

    #[must_use]
    pub const fn token(&self) -> &SessionToken {
        &self.token
    }

    #[must_use]
    pub const fn holder(&self) -> &SessionHolder {
        &self.holder
    }

    /// The last validation response.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn catalog(&self) -> &[Arc<Product>] {
        &self.catalog
    }

    /// The pending order found when the link was opened.
    #[must_use]
    pub const fn pending_order(&self) -> Option<&PendingOrder> {
        self.pending_order.as_ref()
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    #[must_use]
    pub const fn client(&self) -> &CartApiClient {
        &self.client
    }

    /// Look up a catalogue product.
    #[must_use]
    pub fn product(&self, product_id: &ProductId) -> Option<&Arc<Product>> {
        self.catalog.iter().find(|p| &p.id == product_id)
    }

    /// Add a catalogue product to the cart.
    ///
    /// Returns `false` when the product is not in the catalogue.
    pub fn add_product(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        let Some(product) = self.product(product_id).map(Arc::clone) else {
            return false;
        };
        self.cart.add_item(product, quantity);
        true
    }

    /// Submit the cart.
    ///
    /// A successful completion empties the cart. A response with
    /// `success: false` is returned as-is and its message is recorded in the
    /// holder.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotReady` if the session is not valid,
    /// `CheckoutError::EmptyCart` if there is nothing to submit, or
    /// `CheckoutError::Api` if the request fails.
    #[instrument(skip(self), fields(token = %self.token))]
    pub async fn checkout(&mut self) -> Result<CheckoutResponse, CheckoutError> {
        if !self.holder.can_checkout() {
            return Err(CheckoutError::NotReady(
                self.holder
                    .error()
                    .unwrap_or("session has not been validated")
                    .to_string(),
            ));
        }

        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let request = self.cart.checkout_request();
        let response = match self.client.complete_cart(&self.token, &request).await {
            Ok(response) => response,
            Err(e) => {
                self.holder.set_error(Some(e.to_string()));
                return Err(e.into());
            }
        };

        if response.success {
            info!(
                order_id = ?response.order_id,
                items = self.cart.item_count(),
                total = %request.total,
                "Cart completed"
            );
            self.cart.clear();
            self.pending_order = None;
        } else {
            let message = if response.message.is_empty() {
                response
                    .error
                    .clone()
                    .unwrap_or_else(|| "checkout declined".to_string())
            } else {
                response.message.clone()
            };
            warn!(message = %message, "Backend declined cart completion");
            self.holder.set_error(Some(message));
        }

        Ok(response)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use url::Url;

    use super::*;
    use crate::config::StorefrontConfig;

    fn session() -> CartSession {
        let config = StorefrontConfig::new(Url::parse("http://127.0.0.1:9").unwrap());
        let client = CartApiClient::new(&config).unwrap();
        CartSession::new(client, SessionToken::parse("tok-123456789").unwrap())
    }

    fn product(id: &str, stock: u32) -> Arc<Product> {
        Arc::new(Product {
            id: ProductId::new(id),
            name: id.to_string(),
            description: None,
            price: Decimal::from(5),
            stock,
            category: None,
            sku: None,
            image_path: None,
        })
    }

    #[test]
    fn test_new_session_holds_token_but_is_invalid() {
        let session = session();
        assert!(session.holder().token().is_some());
        assert!(!session.holder().is_valid());
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_add_product_requires_catalog_entry() {
        let mut session = session();
        session.catalog = vec![product("a", 3)];

        assert!(session.add_product(&ProductId::new("a"), 5));
        assert!(!session.add_product(&ProductId::new("b"), 1));
        assert_eq!(session.cart().item_count(), 3);
    }

    #[tokio::test]
    async fn test_checkout_refused_before_validation() {
        let mut session = session();
        session.catalog = vec![product("a", 3)];
        session.add_product(&ProductId::new("a"), 1);

        let result = session.checkout().await;
        assert!(matches!(result, Err(CheckoutError::NotReady(_))));
        assert_eq!(session.cart().item_count(), 1);
    }

    #[tokio::test]
    async fn test_checkout_refused_when_empty() {
        let mut session = session();
        session.holder.set_valid(true);

        let result = session.checkout().await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }
}
