//! Catalogue management commands.
//!
//! # Environment Variables
//!
//! - `CARTLINK_API_BASE_URL` - Backend base URL
//! - `CARTLINK_ADMIN_API_KEY` - Bearer token for the dashboard endpoints

use cartlink_admin::{AdminClient, AdminError, ProductFilter};
use cartlink_core::{Price, ProductId};
use tracing::info;

/// Log every product matching `filter`.
///
/// # Errors
///
/// Returns error if the request fails.
pub async fn list(client: &AdminClient, filter: &ProductFilter) -> Result<(), AdminError> {
    let products = client.list_products(filter).await?;

    for product in &products {
        info!(
            id = %product.id,
            name = %product.name,
            price = %Price::new(product.price),
            stock = product.stock,
            active = product.is_active,
            category = product.category.as_deref().unwrap_or("-"),
            image = %client.image_url(product.image_path.as_deref()),
            "Product"
        );
    }
    info!(count = products.len(), "Products listed");
    Ok(())
}

/// Log catalogue counters.
///
/// # Errors
///
/// Returns error if the request fails.
pub async fn stats(client: &AdminClient) -> Result<(), AdminError> {
    let stats = client.product_stats().await?;
    info!(
        total = stats.total,
        active = stats.active,
        inactive = stats.inactive,
        out_of_stock = stats.out_of_stock,
        low_stock = stats.low_stock,
        categories = stats.categories,
        "Product stats"
    );
    Ok(())
}

/// Log the product categories.
///
/// # Errors
///
/// Returns error if the request fails.
pub async fn categories(client: &AdminClient) -> Result<(), AdminError> {
    let categories = client.categories().await?;
    info!(categories = %categories.join(", "), count = categories.len(), "Categories");
    Ok(())
}

/// Set the stock of a product.
///
/// # Errors
///
/// Returns error if the product does not exist or the request fails.
pub async fn set_stock(client: &AdminClient, id: &ProductId, stock: u32) -> Result<(), AdminError> {
    let update = client.update_stock(id, stock).await?;
    info!(
        product = update.product_name.as_deref().unwrap_or(id.as_str()),
        old_stock = update.old_stock,
        new_stock = update.new_stock,
        "Stock set"
    );
    Ok(())
}

/// Flip a product between active and inactive.
///
/// # Errors
///
/// Returns error if the product does not exist or the request fails.
pub async fn toggle(client: &AdminClient, id: &ProductId) -> Result<(), AdminError> {
    let toggle = client.toggle_active(id).await?;
    info!(
        product = toggle.product_name.as_deref().unwrap_or(id.as_str()),
        active = toggle.is_active,
        "Product toggled"
    );
    Ok(())
}
