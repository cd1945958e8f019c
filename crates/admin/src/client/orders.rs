//! Order management: `/api/orders`.

use cartlink_core::OrderId;
use tracing::{debug, info, instrument, warn};

use super::{AdminClient, AdminError, NO_BODY};
use crate::types::{ActionResult, Order, OrderFilter, OrderStats, OrderStatus, StatusChange};

impl AdminClient {
    /// List orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, AdminError> {
        let mut url = self.endpoint(&["orders"])?;
        filter.apply(&mut url);

        let orders: Vec<Order> = self.get(url).await?;
        debug!(count = orders.len(), "Listed orders");
        Ok(orders)
    }

    /// Get a single order.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, AdminError> {
        self.get(self.endpoint(&["orders", id.as_str()])?).await
    }

    /// Move an order to `status`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, AdminError> {
        let order: Order = self
            .patch(
                self.endpoint(&["orders", id.as_str(), "status"])?,
                Some(&StatusChange { status }),
            )
            .await?;
        info!(order_number = %order.order_number, "Order status updated");
        Ok(order)
    }

    /// Cancel an order.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` if the order is already cancelled or
    /// delivered, or `AdminError::NotFound` if it does not exist.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel_order(&self, id: &OrderId) -> Result<Order, AdminError> {
        match self
            .post::<Order, ()>(self.endpoint(&["orders", id.as_str(), "cancel"])?, NO_BODY)
            .await
        {
            Ok(order) => {
                info!(order_number = %order.order_number, "Order cancelled");
                Ok(order)
            }
            Err(AdminError::Validation(message)) => {
                warn!(message = %message, "Order cannot be cancelled");
                Err(AdminError::Validation(message))
            }
            Err(e) => Err(e),
        }
    }

    /// Delete an order and its items.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete_order(&self, id: &OrderId) -> Result<ActionResult, AdminError> {
        let result: ActionResult = self.delete(self.endpoint(&["orders", id.as_str()])?).await?;
        info!(message = %result.message, "Order deleted");
        Ok(result)
    }

    /// Order counters by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn order_stats(&self) -> Result<OrderStats, AdminError> {
        self.get(self.endpoint(&["orders", "stats"])?).await
    }
}
