//! Integration tests for order management through the dashboard client.

use cartlink_admin::{AdminError, OrderFilter, OrderStatus};
use cartlink_core::OrderId;
use cartlink_integration_tests::{BackendState, StubBackend, StubOrder, StubOrderItem};
use rust_decimal::Decimal;

fn item(product_id: &str, quantity: u32, unit_price: f64) -> StubOrderItem {
    StubOrderItem {
        product_id: product_id.to_string(),
        product_name: product_id.to_uppercase(),
        quantity,
        unit_price,
    }
}

async fn backend() -> StubBackend {
    let mut delivered = StubOrder::pending("o-2", "ORD-20251110-0002", vec![item("p-2", 1, 8.5)]);
    delivered.status = "delivered".to_string();

    StubBackend::start(
        BackendState::default()
            .with_order(StubOrder::pending(
                "o-1",
                "ORD-20251109-0001",
                vec![item("p-1", 2, 12.0), item("p-3", 1, 24.75)],
            ))
            .with_order(delivered)
            .with_order(StubOrder::pending("o-3", "ORD-20251112-0003", vec![item("p-1", 1, 12.0)])),
    )
    .await
    .expect("Failed to start stub backend")
}

#[tokio::test]
async fn test_list_newest_first_with_status_filter() {
    let backend = backend().await;
    let client = backend.admin_client(None).expect("client");

    let all = client.list_orders(&OrderFilter::default()).await.expect("list");
    let numbers: Vec<_> = all.iter().map(|o| o.order_number.as_str()).collect();
    assert_eq!(
        numbers,
        ["ORD-20251112-0003", "ORD-20251110-0002", "ORD-20251109-0001"]
    );

    let pending = client
        .list_orders(&OrderFilter {
            status: Some(OrderStatus::Pending),
            limit: Some(1),
            offset: None,
        })
        .await
        .expect("list");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, OrderId::new("o-3"));
}

#[tokio::test]
async fn test_get_order_details() {
    let backend = backend().await;
    let client = backend.admin_client(None).expect("client");

    let order = client.get_order(&OrderId::new("o-1")).await.expect("order");

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total, Decimal::new(4875, 2));
    assert_eq!(order.unit_count(), 3);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.customer_name.as_deref(), Some("Lucía"));
    assert!(order.cancelled_at.is_none());
}

#[tokio::test]
async fn test_stats() {
    let backend = backend().await;
    let client = backend.admin_client(None).expect("client");

    let stats = client.order_stats().await.expect("stats");
    assert_eq!(stats.total, 3);
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.cancelled, 0);
}

#[tokio::test]
async fn test_status_transitions() {
    let backend = backend().await;
    let client = backend.admin_client(None).expect("client");
    let id = OrderId::new("o-1");

    let order = client
        .update_order_status(&id, OrderStatus::Confirmed)
        .await
        .expect("confirm");
    assert_eq!(order.status, OrderStatus::Confirmed);

    let order = client
        .update_order_status(&id, OrderStatus::Abandoned)
        .await
        .expect("abandon");
    assert_eq!(order.status, OrderStatus::Abandoned);
}

#[tokio::test]
async fn test_cancel_rules() {
    let backend = backend().await;
    let client = backend.admin_client(None).expect("client");

    let order = client.cancel_order(&OrderId::new("o-3")).await.expect("cancel");
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert!(order.cancelled_at.is_some());

    match client.cancel_order(&OrderId::new("o-3")).await {
        Err(AdminError::Validation(message)) => assert_eq!(message, "La orden ya está cancelada"),
        other => panic!("expected Validation, got {other:?}"),
    }

    assert!(matches!(
        client.cancel_order(&OrderId::new("o-2")).await,
        Err(AdminError::Validation(_))
    ));
}

#[tokio::test]
async fn test_delete_order() {
    let backend = backend().await;
    let client = backend.admin_client(None).expect("client");

    let result = client.delete_order(&OrderId::new("o-2")).await.expect("delete");
    assert!(result.success);
    assert!(matches!(
        client.get_order(&OrderId::new("o-2")).await,
        Err(AdminError::NotFound(_))
    ));
    assert_eq!(backend.state().orders.len(), 2);
}
