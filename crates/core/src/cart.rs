//! Cart state container.
//!
//! A [`Cart`] is an insertion-ordered list of [`LineItem`]s, at most one per
//! product. Quantities are reconciled against each product's advisory stock:
//!
//! - every line holds `1 <= quantity <= product.stock`;
//! - requests beyond stock are clamped, never rejected;
//! - operations on products that are not in the cart are no-ops.
//!
//! Nothing here returns an error. `set_quantity` floors at 1 while
//! `decrement` removes a line at 1.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::price::MONEY_SCALE;
use crate::types::{CheckoutLine, CheckoutRequest, PendingOrder, Product, ProductId};

/// One product and the quantity requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    product: Arc<Product>,
    quantity: u32,
}

impl LineItem {
    #[must_use]
    pub const fn product(&self) -> &Arc<Product> {
        &self.product
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// The cart for a single customer session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// The line for `product_id`, if any.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.product.id == product_id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| &item.product.id == product_id)
    }

    fn find_mut(&mut self, product_id: &ProductId) -> Option<&mut LineItem> {
        self.items
            .iter_mut()
            .find(|item| &item.product.id == product_id)
    }

    /// Add `quantity` units of `product`, clamped to its stock.
    ///
    /// An existing line grows to `min(existing + quantity, stock)` and picks
    /// up the newer product snapshot. A line whose clamped quantity is zero
    /// is not kept: zero-stock products are never inserted.
    pub fn add_item(&mut self, product: Arc<Product>, quantity: u32) {
        let stock = product.stock;

        let Some(index) = self.position(&product.id) else {
            let quantity = quantity.min(stock);
            if quantity > 0 {
                self.items.push(LineItem { product, quantity });
            }
            return;
        };

        let quantity = self
            .items
            .get(index)
            .map_or(0, LineItem::quantity)
            .saturating_add(quantity)
            .min(stock);
        if quantity == 0 {
            self.items.remove(index);
        } else if let Some(item) = self.items.get_mut(index) {
            item.product = product;
            item.quantity = quantity;
        }
    }

    /// Add a single unit of `product`.
    pub fn add_one(&mut self, product: Arc<Product>) {
        self.add_item(product, 1);
    }

    /// Remove the line for `product_id`, if present.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        if let Some(index) = self.position(product_id) {
            self.items.remove(index);
        }
    }

    /// Set a line's quantity to `max(1, min(quantity, stock))`.
    ///
    /// Never removes the line, even for zero or negative requests.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        if let Some(item) = self.find_mut(product_id) {
            // min then max: the floor of 1 wins when stock is 0
            let clamped = quantity.min(i64::from(item.product.stock)).max(1);
            item.quantity = u32::try_from(clamped).unwrap_or(item.quantity);
        }
    }

    /// Add one unit if the line is below stock.
    pub fn increment(&mut self, product_id: &ProductId) {
        if let Some(item) = self.find_mut(product_id)
            && item.quantity < item.product.stock
        {
            item.quantity += 1;
        }
    }

    /// Remove one unit; a line at quantity 1 is removed entirely.
    pub fn decrement(&mut self, product_id: &ProductId) {
        let Some(index) = self.position(product_id) else {
            return;
        };

        let remove = match self.items.get_mut(index) {
            Some(item) if item.quantity > 1 => {
                item.quantity -= 1;
                false
            }
            Some(_) => true,
            None => false,
        };
        if remove {
            self.items.remove(index);
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of unit price times quantity, unrounded.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// `{product_id, quantity}` pairs in insertion order.
    #[must_use]
    pub fn to_checkout_payload(&self) -> Vec<CheckoutLine> {
        self.items
            .iter()
            .map(|item| CheckoutLine {
                product_id: item.product.id.clone(),
                quantity: item.quantity,
            })
            .collect()
    }

    /// Request body for completing the cart, with the total rounded to cents.
    #[must_use]
    pub fn checkout_request(&self) -> CheckoutRequest {
        CheckoutRequest {
            products: self.to_checkout_payload(),
            total: self
                .subtotal()
                .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero),
        }
    }

    /// Prefill from a pending order using products from `catalog`.
    ///
    /// Items whose product is no longer offered are skipped. Quantities go
    /// through [`Cart::add_item`], so they are clamped to current stock.
    /// Returns the number of pending items that matched the catalogue.
    pub fn restore_pending(&mut self, order: &PendingOrder, catalog: &[Arc<Product>]) -> usize {
        let mut restored = 0;
        for pending in &order.items {
            if let Some(product) = catalog.iter().find(|p| p.id == pending.product_id) {
                self.add_item(Arc::clone(product), pending.quantity);
                restored += 1;
            }
        }
        restored
    }
}
