//! Checkout request and response payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId};

/// One `{product_id, quantity}` pair of a checkout payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /api/cart/{token}/complete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub products: Vec<CheckoutLine>,
    /// Order total; sent as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Response of `POST /api/cart/{token}/complete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_total_is_json_number() {
        let request = CheckoutRequest {
            products: vec![CheckoutLine {
                product_id: ProductId::new("p-1"),
                quantity: 2,
            }],
            total: Decimal::new(15050, 2),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["total"], serde_json::json!(150.5));
        assert_eq!(value["products"][0]["product_id"], "p-1");
        assert_eq!(value["products"][0]["quantity"], 2);
    }

    #[test]
    fn test_failed_response_without_order_id() {
        let response: CheckoutResponse = serde_json::from_str(
            r#"{"success": false, "message": "Token inválido", "error": "token_used"}"#,
        )
        .unwrap();
        assert!(!response.success);
        assert!(response.order_id.is_none());
        assert_eq!(response.error.as_deref(), Some("token_used"));
    }
}
