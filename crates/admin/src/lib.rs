//! Dashboard client for cartlink.
//!
//! Typed access to the backend's product and order management endpoints,
//! used by operators rather than customers.
//!
//! # Example
//!
//! ```rust,ignore
//! let client = AdminClient::new(&AdminConfig::from_env()?)?;
//! let low = client
//!     .list_products(&ProductFilter { in_stock: Some(false), ..Default::default() })
//!     .await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod types;

pub use client::AdminClient;
pub use client::AdminError;
pub use client::products::MAX_IMAGE_BYTES;
pub use config::{AdminConfig, ConfigError};
pub use types::*;
