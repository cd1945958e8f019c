//! Product management shapes for `/api/products`.

use cartlink_core::{Product, ProductId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

use super::push_query;

/// A product as the dashboard sees it, including inactive ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: u32,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(with = "cartlink_core::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "cartlink_core::timestamp")]
    pub updated_at: DateTime<Utc>,
    /// Active and with stock.
    pub in_stock: bool,
    pub has_image: bool,
}

impl AdminProduct {
    /// The catalogue view of this product, as a cart link would receive it.
    #[must_use]
    pub fn to_catalog_product(&self) -> Product {
        Product {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            stock: self.stock,
            category: self.category.clone(),
            sku: self.sku.clone(),
            image_path: self.image_path.clone(),
        }
    }
}

/// Body of `POST /api/products/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub is_active: bool,
}

impl ProductCreate {
    /// An active product with no optional fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Decimal, stock: u32) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            stock,
            category: None,
            sku: None,
            is_active: true,
        }
    }
}

/// Body of `PUT /api/products/{id}`. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ProductUpdate {
    /// Whether the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.sku.is_none()
            && self.is_active.is_none()
    }
}

/// Query filters for `GET /api/products/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    /// Matches name or description.
    pub search: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub in_stock: Option<bool>,
}

impl ProductFilter {
    /// Write the set filters as query parameters.
    pub fn apply(&self, url: &mut Url) {
        push_query(url, "skip", self.skip);
        push_query(url, "limit", self.limit);
        push_query(url, "search", self.search.as_deref());
        push_query(url, "category", self.category.as_deref());
        push_query(url, "is_active", self.is_active);
        push_query(url, "in_stock", self.in_stock);
    }
}

/// Response of `GET /api/products/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub out_of_stock: u64,
    /// Products with fewer than 10 units left.
    pub low_stock: u64,
    pub categories: u64,
}

/// Response of `PATCH /api/products/{id}/stock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub success: bool,
    #[serde(default)]
    pub product_name: Option<String>,
    pub old_stock: u32,
    pub new_stock: u32,
}

/// Response of `PATCH /api/products/{id}/toggle-active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveToggle {
    pub success: bool,
    #[serde(default)]
    pub product_name: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub message: String,
}

/// Response of `POST /api/products/{id}/upload-image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUpload {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub filename: String,
    pub image_url: String,
    #[serde(default)]
    pub product_name: Option<String>,
}

/// Response of `GET /api/products/{id}/image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub has_image: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
}

/// Generic `{success, message}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_product_response() {
        let json = r#"{
            "id": "7b1e", "name": "Café molido", "description": "500g",
            "price": 89.9, "stock": 12, "category": "despensa", "sku": "CAF-500",
            "is_active": true, "image_path": null,
            "created_at": "2025-10-01T12:00:00.512000", "updated_at": "2025-10-02T08:30:00+00:00",
            "in_stock": true, "has_image": false
        }"#;
        let product: AdminProduct = serde_json::from_str(json).unwrap();

        assert_eq!(product.price, Decimal::new(899, 1));
        assert!(product.in_stock);

        let catalog = product.to_catalog_product();
        assert_eq!(catalog.id, ProductId::new("7b1e"));
        assert_eq!(catalog.stock, 12);
    }

    #[test]
    fn test_product_update_skips_unset_fields() {
        let update = ProductUpdate {
            price: Some(Decimal::new(1050, 2)),
            is_active: Some(false),
            ..ProductUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();

        assert_eq!(json, serde_json::json!({"price": 10.5, "is_active": false}));
        assert!(ProductUpdate::default().is_empty());
        assert!(!update.is_empty());
    }

    #[test]
    fn test_product_create_defaults_to_active() {
        let create = ProductCreate::new("Pan", Decimal::from(25), 3);
        let json = serde_json::to_value(&create).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"name": "Pan", "price": 25.0, "stock": 3, "is_active": true})
        );
    }

    #[test]
    fn test_filter_query() {
        let mut url = Url::parse("http://localhost:8000/api/products/").unwrap();
        ProductFilter {
            search: Some("café molido".to_string()),
            is_active: Some(true),
            limit: Some(20),
            ..ProductFilter::default()
        }
        .apply(&mut url);

        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/products/?limit=20&search=caf%C3%A9+molido&is_active=true"
        );
    }

    #[test]
    fn test_empty_filter_adds_no_query() {
        let mut url = Url::parse("http://localhost:8000/api/products/").unwrap();
        ProductFilter::default().apply(&mut url);
        assert_eq!(url.query(), None);
    }
}
