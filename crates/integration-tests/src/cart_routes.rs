//! Stub cart-link endpoints: `/api/cart/{token}...`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::{
    BackendState, CUSTOMER_ID, Reply, SharedState, StubOrder, StubOrderItem, detail, lock,
};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/cart/{token}", get(validate))
        .route("/api/cart/{token}/products", get(products))
        .route("/api/cart/{token}/pending-order", get(pending_order))
        .route("/api/cart/{token}/complete", post(complete))
        .route("/api/cart/{token}/status", get(status))
}

/// Reject unknown, used and expired tokens with a 400, like the backend.
fn require_valid(state: &BackendState, token: &str) -> Result<(), (StatusCode, Json<Value>)> {
    match state.sessions.get(token) {
        None => Err(detail(StatusCode::BAD_REQUEST, "Link no válido")),
        Some(session) => match session.failure() {
            Some((_, message)) => Err(detail(StatusCode::BAD_REQUEST, message)),
            None => Ok(()),
        },
    }
}

async fn validate(State(state): State<SharedState>, Path(token): Path<String>) -> Json<Value> {
    let state = lock(&state);

    let Some(session) = state.sessions.get(&token) else {
        return Json(json!({
            "valid": false,
            "error": "token_not_found",
            "message": "Link no válido",
        }));
    };

    if let Some((code, message)) = session.failure() {
        return Json(json!({ "valid": false, "error": code, "message": message }));
    }

    Json(json!({
        "valid": true,
        "session_id": format!("s-{token}"),
        "customer_id": CUSTOMER_ID,
        "cart_data": { "suggested_products": [] },
        "expires_at": "2099-01-01T00:00:00",
    }))
}

async fn products(State(state): State<SharedState>, Path(token): Path<String>) -> Reply {
    let state = lock(&state);
    require_valid(&state, &token)?;

    let mut available: Vec<_> = state
        .products
        .iter()
        .filter(|p| p.is_active && p.stock > 0)
        .collect();
    available.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(Value::Array(
        available.into_iter().map(|p| p.catalog_json()).collect(),
    )))
}

async fn pending_order(State(state): State<SharedState>, Path(token): Path<String>) -> Json<Value> {
    let state = lock(&state);

    let order = state
        .sessions
        .get(&token)
        .and_then(|session| session.order_id.as_deref())
        .and_then(|id| state.orders.iter().find(|o| o.id == id))
        .filter(|order| order.status == "pending");

    Json(match order {
        Some(order) => json!({ "has_pending_order": true, "order": order.pending_json() }),
        None => json!({ "has_pending_order": false }),
    })
}

async fn complete(
    State(state): State<SharedState>,
    Path(token): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = lock(&state);
    require_valid(&state, &token)?;
    state.completions.push(body.clone());

    if let Some(message) = state.decline_next_completion.take() {
        return Ok(Json(json!({
            "success": false,
            "message": message,
            "error": "stock_changed",
        })));
    }

    let mut items = Vec::new();
    for line in body["products"].as_array().into_iter().flatten() {
        let product_id = line["product_id"].as_str().unwrap_or_default();
        let quantity = line["quantity"]
            .as_u64()
            .and_then(|q| u32::try_from(q).ok())
            .unwrap_or_default();
        let Some(product) = state.product(product_id) else {
            return Err(detail(StatusCode::NOT_FOUND, "Producto no encontrado"));
        };
        items.push(StubOrderItem {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity,
            unit_price: product.price,
        });
    }

    let number = state.orders.len() + 1;
    let order = StubOrder::pending(
        &format!("o-{number}"),
        &format!("ORD-20251112-{number:04}"),
        items,
    );
    let order_id = order.id.clone();
    state.orders.push(order);

    if let Some(session) = state.sessions.get_mut(&token) {
        session.used = true;
        session.order_id = Some(order_id.clone());
    }

    Ok(Json(json!({
        "success": true,
        "message": "Orden recibida. Pronto recibirás un mensaje para completar tu pedido.",
        "order_id": order_id,
    })))
}

async fn status(State(state): State<SharedState>, Path(token): Path<String>) -> Json<Value> {
    let state = lock(&state);

    Json(match state.sessions.get(&token) {
        None => json!({ "exists": false, "message": "Sesión no encontrada" }),
        Some(session) => json!({
            "exists": true,
            "used": session.used,
            "expired": session.expired,
            "valid": session.failure().is_none(),
            "order_id": session.order_id,
            "expires_at": "2099-01-01T00:00:00",
        }),
    })
}
