//! Cartlink Storefront - customer cart-link client.
//!
//! A customer receives a tokenised cart link from the chat bot. This crate
//! validates the link, loads the catalogue offered to it, keeps the cart
//! while the customer shops and submits it to the backend.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven client configuration
//! - [`api`] - REST client for the `/api/cart` endpoints
//! - [`checkout`] - Per-link session flow (validate, shop, complete)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;

pub use api::{ApiError, CartApiClient, CartStatus};
pub use checkout::{CartSession, CheckoutError};
pub use config::{ConfigError, StorefrontConfig};
