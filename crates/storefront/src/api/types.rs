//! Cart endpoint shapes that are not shared with other crates.

use cartlink_core::OrderId;
use serde::{Deserialize, Serialize};

/// Response of `GET /api/cart/{token}/status`.
///
/// Lets a client poll whether a cart link has been used or has expired
/// without re-running full validation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartStatus {
    pub exists: bool,
    #[serde(default)]
    pub used: Option<bool>,
    #[serde(default)]
    pub expired: Option<bool>,
    #[serde(default)]
    pub valid: Option<bool>,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CartStatus {
    /// Whether the link can still be completed.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.exists && self.valid.unwrap_or(false)
    }
}
