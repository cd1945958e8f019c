//! Cart-link commands.
//!
//! # Usage
//!
//! ```bash
//! cartlink cart show 3f9a1c27e4b84d0f
//! cartlink cart checkout 3f9a1c27e4b84d0f --item p-1=2 --item p-7=1
//! cartlink cart status 3f9a1c27e4b84d0f
//! ```
//!
//! # Environment Variables
//!
//! - `CARTLINK_API_BASE_URL` - Backend base URL
//! - `CARTLINK_API_TIMEOUT_SECS` - Request timeout in seconds

use std::str::FromStr;

use cartlink_core::{LineItem, Price, ProductId, SessionToken};
use cartlink_storefront::{
    ApiError, CartApiClient, CartSession, CheckoutError, ConfigError, StorefrontConfig,
};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during cart commands.
#[derive(Debug, Error)]
pub enum CartCommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The link was rejected by the backend.
    #[error("Cart link is not usable: {0}")]
    NotUsable(String),

    /// A requested product is not offered to this link.
    #[error("Product {0} is not in this cart link's catalogue")]
    UnknownProduct(ProductId),

    /// The backend answered the completion with `success: false`.
    #[error("Checkout declined: {0}")]
    Declined(String),
}

/// A `PRODUCT_ID=QTY` command-line argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemArg {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl FromStr for ItemArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, quantity) = s
            .split_once('=')
            .ok_or_else(|| format!("expected PRODUCT_ID=QTY, got '{s}'"))?;

        let id = id.trim();
        if id.is_empty() {
            return Err(format!("missing product id in '{s}'"));
        }

        let quantity = quantity
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid quantity in '{s}': {e}"))?;
        if quantity == 0 {
            return Err(format!("quantity must be at least 1 in '{s}'"));
        }

        Ok(Self {
            product_id: ProductId::new(id),
            quantity,
        })
    }
}

fn client() -> Result<CartApiClient, CartCommandError> {
    let config = StorefrontConfig::from_env()?;
    Ok(CartApiClient::new(&config)?)
}

/// Open a cart link and log what a customer would see.
///
/// # Errors
///
/// Returns error if configuration is invalid or a request fails.
pub async fn show(token: SessionToken) -> Result<(), CartCommandError> {
    let session = CartSession::open(client()?, token).await?;
    let holder = session.holder();

    info!(
        valid = holder.is_valid(),
        error = holder.error().unwrap_or_default(),
        expires_at = session
            .session()
            .and_then(|s| s.expires_at.as_deref())
            .unwrap_or_default(),
        "Cart link"
    );
    if !holder.is_valid() {
        return Ok(());
    }

    for product in session.catalog() {
        info!(
            id = %product.id,
            name = %product.name,
            price = %product.unit_price(),
            stock = product.stock,
            image = %session.client().image_url(product.image_path.as_deref()),
            "Product"
        );
    }

    if let Some(order) = session.pending_order() {
        info!(
            order_number = %order.order_number,
            total = %order.total,
            "Pending order restored"
        );
    }

    log_cart(&session);
    Ok(())
}

/// Fill the cart of a link with `items` and submit it.
///
/// Quantities above the available stock are clamped by the cart.
///
/// # Errors
///
/// Returns error if the link is not usable, an item is not in the catalogue,
/// or the backend declines the cart.
pub async fn checkout(token: SessionToken, items: &[ItemArg]) -> Result<(), CartCommandError> {
    let mut session = CartSession::open(client()?, token).await?;
    if !session.holder().is_valid() {
        return Err(CartCommandError::NotUsable(
            session.holder().error().unwrap_or("invalid").to_string(),
        ));
    }

    // Start from what was asked, not from a restored pending order
    session.cart_mut().clear();

    for item in items {
        if !session.add_product(&item.product_id, item.quantity) {
            return Err(CartCommandError::UnknownProduct(item.product_id.clone()));
        }
        let added = session
            .cart()
            .get(&item.product_id)
            .map_or(0, LineItem::quantity);
        if added < item.quantity {
            warn!(
                product_id = %item.product_id,
                requested = item.quantity,
                added,
                "Quantity clamped to available stock"
            );
        }
    }

    log_cart(&session);

    let response = session.checkout().await?;
    if !response.success {
        return Err(CartCommandError::Declined(
            session.holder().error().unwrap_or("declined").to_string(),
        ));
    }

    info!(
        order_id = %response.order_id.as_ref().map(ToString::to_string).unwrap_or_default(),
        message = %response.message,
        "Cart completed"
    );
    Ok(())
}

/// Log whether a cart link has been used or has expired.
///
/// # Errors
///
/// Returns error if configuration is invalid or the request fails.
pub async fn status(token: &SessionToken) -> Result<(), CartCommandError> {
    let status = client()?.cart_status(token).await?;
    info!(
        exists = status.exists,
        used = ?status.used,
        expired = ?status.expired,
        usable = status.is_usable(),
        message = status.message.as_deref().unwrap_or_default(),
        "Cart link status"
    );
    Ok(())
}

fn log_cart(session: &CartSession) {
    let cart = session.cart();
    for line in cart.items() {
        info!(
            id = %line.product().id,
            name = %line.product().name,
            quantity = line.quantity(),
            line_total = %line.line_total(),
            "Cart line"
        );
    }
    info!(
        lines = cart.len(),
        items = cart.item_count(),
        subtotal = %Price::new(cart.subtotal()),
        "Cart"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_arg() {
        let item: ItemArg = "p-1=3".parse().unwrap();
        assert_eq!(item.product_id, ProductId::new("p-1"));
        assert_eq!(item.quantity, 3);

        let item: ItemArg = " 7b1e-44 = 12 ".parse().unwrap();
        assert_eq!(item.product_id, ProductId::new("7b1e-44"));
        assert_eq!(item.quantity, 12);
    }

    #[test]
    fn test_parse_item_arg_rejects_bad_input() {
        assert!("p-1".parse::<ItemArg>().is_err());
        assert!("=2".parse::<ItemArg>().is_err());
        assert!("p-1=dos".parse::<ItemArg>().is_err());
        assert!("p-1=0".parse::<ItemArg>().is_err());
        assert!("p-1=-1".parse::<ItemArg>().is_err());
    }
}
