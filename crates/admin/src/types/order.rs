//! Order management shapes for `/api/orders`.

use std::fmt;
use std::str::FromStr;

use cartlink_core::{CustomerId, OrderId, OrderItemId, ProductId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::push_query;

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created from a cart link, awaiting confirmation.
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
    /// Pending order whose customer never came back.
    Abandoned,
}

impl OrderStatus {
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::Abandoned,
    ];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Abandoned => "abandoned",
        }
    }

    /// Whether the backend still accepts a cancellation.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        !matches!(self, Self::Cancelled | Self::Delivered)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown order status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status '{0}'")]
pub struct ParseOrderStatusError(pub String);

impl FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseOrderStatusError(s.to_string()))
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// An order as the dashboard sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub customer_id: CustomerId,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
    pub payment_method: String,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub delivery_latitude: Option<f64>,
    #[serde(default)]
    pub delivery_longitude: Option<f64>,
    #[serde(default)]
    pub delivery_reference: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(with = "cartlink_core::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "cartlink_core::timestamp")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, with = "cartlink_core::timestamp::option")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, with = "cartlink_core::timestamp::option")]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default, with = "cartlink_core::timestamp::option")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default, with = "cartlink_core::timestamp::option")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Total units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Delivery coordinates, when both are known.
    #[must_use]
    pub const fn delivery_location(&self) -> Option<(f64, f64)> {
        match (self.delivery_latitude, self.delivery_longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

/// Query filters for `GET /api/orders`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Backend default is 100, maximum 1000.
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl OrderFilter {
    /// Write the set filters as query parameters.
    pub fn apply(&self, url: &mut Url) {
        push_query(url, "status", self.status);
        push_query(url, "limit", self.limit);
        push_query(url, "offset", self.offset);
    }
}

/// Response of `GET /api/orders/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total: u64,
    pub pending: u64,
    pub confirmed: u64,
    pub shipped: u64,
    pub delivered: u64,
    pub cancelled: u64,
}

/// Body of `PATCH /api/orders/{id}/status`.
#[derive(Debug, Serialize)]
pub(crate) struct StatusChange {
    pub status: OrderStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ORDER_JSON: &str = r#"{
        "id": "o-1", "order_number": "ORD-20251112-0001", "customer_id": "c-1",
        "customer_name": "Lucía", "customer_phone": null, "status": "pending",
        "subtotal": 150.0, "tax": 0.0, "shipping_cost": 0.0, "total": 150.0,
        "payment_method": "N/A", "delivery_address": null,
        "delivery_latitude": 19.43, "delivery_longitude": -99.13,
        "items": [
            {"id": "i-1", "product_id": "p-1", "product_name": "Agua", "quantity": 2,
             "unit_price": 25.0, "subtotal": 50.0},
            {"id": "i-2", "product_id": "p-2", "product_name": "Pan", "quantity": 4,
             "unit_price": 25.0, "subtotal": 100.0}
        ],
        "created_at": "2025-11-12T10:00:00.000123", "updated_at": "2025-11-12T10:05:00",
        "confirmed_at": null
    }"#;

    #[test]
    fn test_deserialize_order() {
        let order: Order = serde_json::from_str(ORDER_JSON).unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, Decimal::from(150));
        assert_eq!(order.unit_count(), 6);
        assert_eq!(order.delivery_location(), Some((19.43, -99.13)));
        assert!(order.confirmed_at.is_none());
        assert!(order.cancelled_at.is_none());
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in OrderStatus::ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert_eq!(" Shipped ".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(
            "lost".parse::<OrderStatus>(),
            Err(ParseOrderStatusError("lost".to_string()))
        );
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&StatusChange {
                status: OrderStatus::Abandoned
            })
            .unwrap(),
            r#"{"status":"abandoned"}"#
        );
    }

    #[test]
    fn test_cancellable() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Shipped.is_cancellable());
        assert!(!OrderStatus::Delivered.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn test_filter_query() {
        let mut url = Url::parse("http://localhost:8000/api/orders").unwrap();
        OrderFilter {
            status: Some(OrderStatus::Confirmed),
            limit: Some(50),
            offset: None,
        }
        .apply(&mut url);

        assert_eq!(url.query(), Some("status=confirmed&limit=50"));
    }
}
