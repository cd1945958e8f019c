//! Cartlink Core - Shared types and cart state.
//!
//! This crate provides the pieces shared by every cartlink component:
//! - `storefront` - Customer cart-link client and checkout flow
//! - `admin` - Dashboard client for products and orders
//! - `cli` - Operator command line
//!
//! # Architecture
//!
//! The core crate contains only types and in-memory state - no I/O, no HTTP
//! clients. Every cart and session holder is constructed explicitly and owned
//! by exactly one customer session.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, products, images, checkout payloads
//! - [`cart`] - Stock-bounded cart state container
//! - [`session`] - Cart-link session response and session holder

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod session;
pub mod types;

pub use cart::{Cart, LineItem};
pub use session::{Session, SessionHolder};
pub use types::*;
