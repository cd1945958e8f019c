//! Order management commands.
//!
//! # Environment Variables
//!
//! - `CARTLINK_API_BASE_URL` - Backend base URL
//! - `CARTLINK_ADMIN_API_KEY` - Bearer token for the dashboard endpoints

use cartlink_admin::{AdminClient, AdminError, OrderFilter, OrderStatus};
use cartlink_core::{OrderId, Price};
use tracing::info;

/// Log every order matching `filter`, newest first.
///
/// # Errors
///
/// Returns error if the request fails.
pub async fn list(client: &AdminClient, filter: &OrderFilter) -> Result<(), AdminError> {
    let orders = client.list_orders(filter).await?;

    for order in &orders {
        info!(
            id = %order.id,
            number = %order.order_number,
            status = %order.status,
            customer = order.customer_name.as_deref().unwrap_or("-"),
            items = order.unit_count(),
            total = %Price::new(order.total),
            created_at = %order.created_at,
            "Order"
        );
    }
    info!(count = orders.len(), "Orders listed");
    Ok(())
}

/// Log order counters by status.
///
/// # Errors
///
/// Returns error if the request fails.
pub async fn stats(client: &AdminClient) -> Result<(), AdminError> {
    let stats = client.order_stats().await?;
    info!(
        total = stats.total,
        pending = stats.pending,
        confirmed = stats.confirmed,
        shipped = stats.shipped,
        delivered = stats.delivered,
        cancelled = stats.cancelled,
        "Order stats"
    );
    Ok(())
}

/// Move an order to `status`.
///
/// # Errors
///
/// Returns error if the order does not exist or the request fails.
pub async fn set_status(
    client: &AdminClient,
    id: &OrderId,
    status: OrderStatus,
) -> Result<(), AdminError> {
    let order = client.update_order_status(id, status).await?;
    info!(number = %order.order_number, status = %order.status, "Order updated");
    Ok(())
}

/// Cancel an order.
///
/// # Errors
///
/// Returns error if the order cannot be cancelled or the request fails.
pub async fn cancel(client: &AdminClient, id: &OrderId) -> Result<(), AdminError> {
    let order = client.cancel_order(id).await?;
    info!(
        number = %order.order_number,
        cancelled_at = %order.cancelled_at.map(|at| at.to_rfc3339()).unwrap_or_default(),
        "Order cancelled"
    );
    Ok(())
}
