//! Catalogue product as served to a cart link.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product offered in the cart-link catalogue.
///
/// Products are read-only snapshots of backend state. The cart holds them
/// behind `Arc` and only ever swaps one snapshot for a newer one; `stock` is
/// advisory and caps how many units a cart line may request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// Units available; the ceiling for any cart quantity.
    pub stock: u32,
    pub category: Option<String>,
    pub sku: Option<String>,
    /// Absolute URL or backend-relative path of the product image.
    pub image_path: Option<String>,
}

impl Product {
    /// Unit price as a [`Price`].
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::new(self.price)
    }

    /// Whether at least one unit can be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}
