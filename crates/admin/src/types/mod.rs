//! Dashboard request and response shapes.

mod order;
mod product;

pub(crate) use order::StatusChange;
pub use order::{Order, OrderFilter, OrderItem, OrderStats, OrderStatus, ParseOrderStatusError};
pub use product::{
    ActionResult, ActiveToggle, AdminProduct, ImageInfo, ImageUpload, ProductCreate,
    ProductFilter, ProductStats, ProductUpdate, StockUpdate,
};

/// Append `key=value` to `url` when `value` is present.
pub(crate) fn push_query<T: ToString>(url: &mut url::Url, key: &str, value: Option<T>) {
    if let Some(value) = value {
        url.query_pairs_mut().append_pair(key, &value.to_string());
    }
}
