//! Pending order attached to a cart link.
//!
//! When a customer re-opens a cart link after confirming it, the backend
//! returns the order still awaiting confirmation so the cart can be prefilled.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId};

/// Response of `GET /api/cart/{token}/pending-order`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PendingOrderResponse {
    pub has_pending_order: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<PendingOrder>,
}

impl PendingOrderResponse {
    /// The pending order, if the backend reported one.
    #[must_use]
    pub fn into_order(self) -> Option<PendingOrder> {
        if self.has_pending_order { self.order } else { None }
    }
}

/// An order in `pending` status linked to a cart session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub id: OrderId,
    pub order_number: String,
    pub total: Decimal,
    #[serde(default)]
    pub items: Vec<PendingOrderItem>,
}

/// A line of a pending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pending_order() {
        let response: PendingOrderResponse =
            serde_json::from_str(r#"{"has_pending_order": false}"#).unwrap();
        assert!(response.into_order().is_none());
    }

    #[test]
    fn test_pending_order_items() {
        let json = r#"{
            "has_pending_order": true,
            "order": {
                "id": "o-1",
                "order_number": "ORD-20250101-0001",
                "total": 45.0,
                "items": [
                    {"product_id": "p-1", "product_name": "Agua", "quantity": 3,
                     "unit_price": 15.0, "subtotal": 45.0}
                ]
            }
        }"#;

        let order = serde_json::from_str::<PendingOrderResponse>(json)
            .unwrap()
            .into_order()
            .unwrap();
        assert_eq!(order.order_number, "ORD-20250101-0001");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 3);
    }
}
