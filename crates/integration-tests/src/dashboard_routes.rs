//! Stub dashboard endpoints: `/api/products...` and `/api/orders...`.

use std::collections::HashMap;

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::{ReceivedUpload, Reply, SharedState, StubProduct, detail, lock};

const VALID_STATUSES: &[&str] = &[
    "pending",
    "confirmed",
    "shipped",
    "delivered",
    "cancelled",
    "abandoned",
];

pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/api/products/", get(list_products).post(create_product))
        .route("/api/products/stats", get(product_stats))
        .route("/api/products/categories", get(categories))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/products/{id}/stock", patch(update_stock))
        .route("/api/products/{id}/toggle-active", patch(toggle_active))
        .route("/api/products/{id}/upload-image", post(upload_image))
        .route("/api/products/{id}/delete-image", delete(delete_image))
        .route("/api/products/{id}/image", get(image_info))
        .route("/api/orders", get(list_orders))
        .route("/api/orders/stats", get(order_stats))
        .route("/api/orders/{id}", get(get_order).delete(delete_order))
        .route("/api/orders/{id}/status", patch(update_order_status))
        .route("/api/orders/{id}/cancel", post(cancel_order))
        .route_layer(middleware::from_fn_with_state(state, record_authorization))
}

async fn record_authorization(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    lock(&state).authorizations.push(authorization);
    next.run(request).await
}

fn product_not_found() -> (StatusCode, Json<Value>) {
    detail(StatusCode::NOT_FOUND, "Producto no encontrado")
}

fn order_not_found() -> (StatusCode, Json<Value>) {
    detail(StatusCode::NOT_FOUND, "Orden no encontrada")
}

fn flag(query: &HashMap<String, String>, key: &str) -> Option<bool> {
    query.get(key).and_then(|raw| raw.parse().ok())
}

fn number(query: &HashMap<String, String>, key: &str) -> Option<usize> {
    query.get(key).and_then(|raw| raw.parse().ok())
}

// =============================================================================
// Products
// =============================================================================

async fn list_products(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let state = lock(&state);
    let search = query.get("search").map(|s| s.to_lowercase());

    let products: Vec<Value> = state
        .products
        .iter()
        .filter(|p| {
            search
                .as_deref()
                .is_none_or(|needle| p.name.to_lowercase().contains(needle))
        })
        .filter(|p| {
            query
                .get("category")
                .is_none_or(|c| p.category.as_deref() == Some(c.as_str()))
        })
        .filter(|p| flag(&query, "is_active").is_none_or(|active| p.is_active == active))
        .filter(|p| flag(&query, "in_stock").is_none_or(|in_stock| (p.stock > 0) == in_stock))
        .skip(number(&query, "skip").unwrap_or(0))
        .take(number(&query, "limit").unwrap_or(100))
        .map(StubProduct::admin_json)
        .collect();

    Json(Value::Array(products))
}

async fn create_product(State(state): State<SharedState>, Json(body): Json<Value>) -> Reply {
    let name = body["name"].as_str().unwrap_or_default().trim().to_string();
    let price = body["price"].as_f64().unwrap_or_default();
    if name.is_empty() || price <= 0.0 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [{ "loc": ["body", "price"], "msg": "Input should be greater than 0" }] })),
        ));
    }

    let mut state = lock(&state);
    let mut product = StubProduct::new(
        &format!("p-{}", state.products.len() + 1),
        &name,
        price,
        body["stock"]
            .as_u64()
            .and_then(|s| u32::try_from(s).ok())
            .unwrap_or_default(),
    );
    product.is_active = body["is_active"].as_bool().unwrap_or(true);
    product.category = body["category"].as_str().map(str::to_string);

    let response = product.admin_json();
    state.products.push(product);
    Ok(Json(response))
}

async fn product_stats(State(state): State<SharedState>) -> Json<Value> {
    let state = lock(&state);
    let products = &state.products;

    let active = products.iter().filter(|p| p.is_active).count();
    let mut categories: Vec<_> = products
        .iter()
        .filter_map(|p| p.category.as_deref())
        .collect();
    categories.sort_unstable();
    categories.dedup();

    Json(json!({
        "total": products.len(),
        "active": active,
        "inactive": products.len() - active,
        "out_of_stock": products.iter().filter(|p| p.stock == 0).count(),
        "low_stock": products.iter().filter(|p| p.stock > 0 && p.stock < 10).count(),
        "categories": categories.len(),
    }))
}

async fn categories(State(state): State<SharedState>) -> Json<Value> {
    let state = lock(&state);
    let mut categories: Vec<_> = state
        .products
        .iter()
        .filter(|p| p.is_active)
        .filter_map(|p| p.category.clone())
        .collect();
    categories.sort();
    categories.dedup();

    Json(json!({ "categories": categories }))
}

async fn get_product(State(state): State<SharedState>, Path(id): Path<String>) -> Reply {
    let state = lock(&state);
    let product = state.product(&id).ok_or_else(product_not_found)?;
    Ok(Json(product.admin_json()))
}

async fn update_product(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = lock(&state);
    let product = state.product_mut(&id).ok_or_else(product_not_found)?;

    if let Some(name) = body["name"].as_str() {
        product.name = name.to_string();
    }
    if let Some(price) = body["price"].as_f64() {
        product.price = price;
    }
    if let Some(stock) = body["stock"].as_u64().and_then(|s| u32::try_from(s).ok()) {
        product.stock = stock;
    }
    if let Some(category) = body["category"].as_str() {
        product.category = Some(category.to_string());
    }
    if let Some(active) = body["is_active"].as_bool() {
        product.is_active = active;
    }

    Ok(Json(product.admin_json()))
}

async fn delete_product(State(state): State<SharedState>, Path(id): Path<String>) -> Reply {
    let mut state = lock(&state);
    let index = state
        .products
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(product_not_found)?;
    let product = state.products.remove(index);

    Ok(Json(json!({
        "success": true,
        "message": format!("Producto '{}' eliminado", product.name),
    })))
}

async fn update_stock(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let new_stock = query
        .get("new_stock")
        .and_then(|raw| raw.parse::<u32>().ok())
        .ok_or_else(|| detail(StatusCode::UNPROCESSABLE_ENTITY, "new_stock is required"))?;

    let mut state = lock(&state);
    let product = state.product_mut(&id).ok_or_else(product_not_found)?;
    let old_stock = product.stock;
    product.stock = new_stock;

    Ok(Json(json!({
        "success": true,
        "product_name": product.name,
        "old_stock": old_stock,
        "new_stock": new_stock,
    })))
}

async fn toggle_active(State(state): State<SharedState>, Path(id): Path<String>) -> Reply {
    let mut state = lock(&state);
    let product = state.product_mut(&id).ok_or_else(product_not_found)?;
    product.is_active = !product.is_active;

    Ok(Json(json!({
        "success": true,
        "product_name": product.name,
        "is_active": product.is_active,
        "message": if product.is_active { "Producto activado" } else { "Producto desactivado" },
    })))
}

async fn upload_image(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Reply {
    let mut received = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let size = field.bytes().await.map(|bytes| bytes.len()).unwrap_or_default();
        received = Some(ReceivedUpload {
            file_name,
            content_type,
            size,
        });
    }

    let upload = received.ok_or_else(|| detail(StatusCode::UNPROCESSABLE_ENTITY, "file is required"))?;
    if !upload.content_type.starts_with("image/") {
        return Err(detail(StatusCode::BAD_REQUEST, "El archivo debe ser una imagen"));
    }

    let mut state = lock(&state);
    let product = state.product_mut(&id).ok_or_else(product_not_found)?;
    let filename = format!("{id}-{}", upload.file_name);
    let image_url = format!("/static/products/{filename}");
    product.image_path = Some(image_url.clone());
    let product_name = product.name.clone();
    state.uploads.push(upload);

    Ok(Json(json!({
        "success": true,
        "message": "Imagen subida exitosamente",
        "filename": filename,
        "image_url": image_url,
        "product_name": product_name,
    })))
}

async fn delete_image(State(state): State<SharedState>, Path(id): Path<String>) -> Reply {
    let mut state = lock(&state);
    let product = state.product_mut(&id).ok_or_else(product_not_found)?;
    if product.image_path.take().is_none() {
        return Err(detail(StatusCode::BAD_REQUEST, "El producto no tiene imagen"));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Imagen eliminada",
        "product_name": product.name,
    })))
}

async fn image_info(State(state): State<SharedState>, Path(id): Path<String>) -> Reply {
    let state = lock(&state);
    let product = state.product(&id).ok_or_else(product_not_found)?;

    Ok(Json(match &product.image_path {
        Some(path) => json!({
            "has_image": true,
            "image_url": path,
            "product_name": product.name,
        }),
        None => json!({ "has_image": false }),
    }))
}

// =============================================================================
// Orders
// =============================================================================

async fn list_orders(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let state = lock(&state);

    let orders: Vec<Value> = state
        .orders
        .iter()
        .rev()
        .filter(|o| query.get("status").is_none_or(|s| &o.status == s))
        .skip(number(&query, "offset").unwrap_or(0))
        .take(number(&query, "limit").unwrap_or(100))
        .map(crate::StubOrder::admin_json)
        .collect();

    Json(Value::Array(orders))
}

async fn order_stats(State(state): State<SharedState>) -> Json<Value> {
    let state = lock(&state);
    let count = |status: &str| state.orders.iter().filter(|o| o.status == status).count();

    Json(json!({
        "total": state.orders.len(),
        "pending": count("pending"),
        "confirmed": count("confirmed"),
        "shipped": count("shipped"),
        "delivered": count("delivered"),
        "cancelled": count("cancelled"),
    }))
}

async fn get_order(State(state): State<SharedState>, Path(id): Path<String>) -> Reply {
    let state = lock(&state);
    let order = state
        .orders
        .iter()
        .find(|o| o.id == id)
        .ok_or_else(order_not_found)?;
    Ok(Json(order.admin_json()))
}

async fn delete_order(State(state): State<SharedState>, Path(id): Path<String>) -> Reply {
    let mut state = lock(&state);
    let index = state
        .orders
        .iter()
        .position(|o| o.id == id)
        .ok_or_else(order_not_found)?;
    let order = state.orders.remove(index);

    Ok(Json(json!({
        "success": true,
        "message": format!("Orden {} eliminada", order.order_number),
    })))
}

async fn update_order_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let status = body["status"].as_str().unwrap_or_default();
    if !VALID_STATUSES.contains(&status) {
        return Err(detail(
            StatusCode::BAD_REQUEST,
            &format!("Estado inválido. Debe ser uno de: {}", VALID_STATUSES.join(", ")),
        ));
    }

    let mut state = lock(&state);
    let order = state.order_mut(&id).ok_or_else(order_not_found)?;
    order.status = status.to_string();
    Ok(Json(order.admin_json()))
}

async fn cancel_order(State(state): State<SharedState>, Path(id): Path<String>) -> Reply {
    let mut state = lock(&state);
    let order = state.order_mut(&id).ok_or_else(order_not_found)?;

    match order.status.as_str() {
        "cancelled" => Err(detail(StatusCode::BAD_REQUEST, "La orden ya está cancelada")),
        "delivered" => Err(detail(
            StatusCode::BAD_REQUEST,
            "No se puede cancelar una orden ya entregada",
        )),
        _ => {
            order.status = "cancelled".to_string();
            order.cancelled = true;
            Ok(Json(order.admin_json()))
        }
    }
}
