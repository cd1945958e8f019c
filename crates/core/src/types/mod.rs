//! Core types for cartlink.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod checkout;
pub mod error_body;
pub mod id;
pub mod image;
pub mod order;
pub mod price;
pub mod product;
pub mod timestamp;
pub mod token;

pub use checkout::{CheckoutLine, CheckoutRequest, CheckoutResponse};
pub use id::*;
pub use image::{DEFAULT_PLACEHOLDER_IMAGE, ImageRef, ImageResolver};
pub use order::{PendingOrder, PendingOrderItem, PendingOrderResponse};
pub use price::Price;
pub use product::Product;
pub use token::{SessionToken, TokenError};
