//! Command implementations.
//!
//! Output goes through `tracing` so it can be filtered and formatted like
//! every other log line.

pub mod cart;
pub mod orders;
pub mod products;

use cartlink_admin::{AdminClient, AdminConfig};

/// Build a dashboard client from the environment.
///
/// # Errors
///
/// Returns error if the configuration is invalid or the client fails to build.
pub fn admin_client() -> Result<AdminClient, Box<dyn std::error::Error>> {
    let config = AdminConfig::from_env()?;
    Ok(AdminClient::new(&config)?)
}
