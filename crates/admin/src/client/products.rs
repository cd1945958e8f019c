//! Product management: `/api/products`.

use std::path::Path;

use cartlink_core::ProductId;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::{AdminClient, AdminError, NO_BODY};
use crate::types::{
    ActionResult, ActiveToggle, AdminProduct, ImageInfo, ImageUpload, ProductCreate,
    ProductFilter, ProductStats, ProductUpdate, StockUpdate,
};

/// Largest image the backend accepts.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Image extensions the backend accepts, with their content types.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    categories: Vec<String>,
}

impl AdminClient {
    /// List products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<AdminProduct>, AdminError> {
        let mut url = self.endpoint(&["products", ""])?;
        filter.apply(&mut url);

        let products: Vec<AdminProduct> = self.get(url).await?;
        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Catalogue counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn product_stats(&self) -> Result<ProductStats, AdminError> {
        self.get(self.endpoint(&["products", "stats"])?).await
    }

    /// Distinct categories of active products, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, AdminError> {
        let response: CategoriesResponse =
            self.get(self.endpoint(&["products", "categories"])?).await?;
        Ok(response.categories)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<AdminProduct, AdminError> {
        self.get(self.endpoint(&["products", id.as_str()])?).await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` if the backend rejects the fields
    /// (for example a duplicate SKU).
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(
        &self,
        product: &ProductCreate,
    ) -> Result<AdminProduct, AdminError> {
        let created: AdminProduct = self
            .post(self.endpoint(&["products", ""])?, Some(product))
            .await?;
        info!(product_id = %created.id, "Product created");
        Ok(created)
    }

    /// Update the fields set in `update`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` if `update` is empty or rejected, or
    /// `AdminError::NotFound` if the product does not exist.
    #[instrument(skip(self, update), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        update: &ProductUpdate,
    ) -> Result<AdminProduct, AdminError> {
        if update.is_empty() {
            return Err(AdminError::Validation("no fields to update".to_string()));
        }
        self.put(self.endpoint(&["products", id.as_str()])?, update)
            .await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<ActionResult, AdminError> {
        let result: ActionResult = self.delete(self.endpoint(&["products", id.as_str()])?).await?;
        info!(message = %result.message, "Product deleted");
        Ok(result)
    }

    /// Set the stock of a product.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn update_stock(
        &self,
        id: &ProductId,
        new_stock: u32,
    ) -> Result<StockUpdate, AdminError> {
        let mut url = self.endpoint(&["products", id.as_str(), "stock"])?;
        url.query_pairs_mut()
            .append_pair("new_stock", &new_stock.to_string());

        let update: StockUpdate = self.patch(url, NO_BODY).await?;
        info!(
            old_stock = update.old_stock,
            new_stock = update.new_stock,
            "Stock updated"
        );
        Ok(update)
    }

    /// Flip a product between active and inactive.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn toggle_active(&self, id: &ProductId) -> Result<ActiveToggle, AdminError> {
        let toggle: ActiveToggle = self
            .patch(
                self.endpoint(&["products", id.as_str(), "toggle-active"])?,
                NO_BODY,
            )
            .await?;
        info!(is_active = toggle.is_active, "Product toggled");
        Ok(toggle)
    }

    /// Upload (or replace) the image of a product.
    ///
    /// The file name decides the content type; only JPEG, PNG, GIF and WebP
    /// images up to [`MAX_IMAGE_BYTES`] are sent.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` if the file is rejected locally or by
    /// the backend, or `AdminError::NotFound` if the product does not exist.
    #[instrument(skip(self, bytes), fields(product_id = %id, size = bytes.len()))]
    pub async fn upload_product_image(
        &self,
        id: &ProductId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ImageUpload, AdminError> {
        let content_type = image_content_type(file_name)?;
        if bytes.is_empty() {
            return Err(AdminError::Validation("image file is empty".to_string()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(AdminError::Validation(format!(
                "image is {} bytes, the limit is {MAX_IMAGE_BYTES}",
                bytes.len()
            )));
        }

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| AdminError::Multipart(e.to_string()))?;
        let form = Form::new().part("file", part);

        let upload: ImageUpload = self
            .post_multipart(
                self.endpoint(&["products", id.as_str(), "upload-image"])?,
                form,
            )
            .await?;
        info!(filename = %upload.filename, "Product image uploaded");
        Ok(upload)
    }

    /// Remove the image of a product.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` if the product has no image, or
    /// `AdminError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product_image(&self, id: &ProductId) -> Result<ActionResult, AdminError> {
        self.delete(self.endpoint(&["products", id.as_str(), "delete-image"])?)
            .await
    }

    /// Image information of a product.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product_image(&self, id: &ProductId) -> Result<ImageInfo, AdminError> {
        self.get(self.endpoint(&["products", id.as_str(), "image"])?)
            .await
    }
}

/// Content type for an image file name, by extension.
fn image_content_type(file_name: &str) -> Result<&'static str, AdminError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    IMAGE_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, content_type)| *content_type)
        .ok_or_else(|| {
            AdminError::Validation(format!(
                "unsupported image type '{file_name}', expected one of: jpg, jpeg, png, gif, webp"
            ))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use url::Url;

    use super::*;
    use crate::config::AdminConfig;

    fn client() -> AdminClient {
        AdminClient::new(&AdminConfig::new(Url::parse("http://127.0.0.1:9").unwrap())).unwrap()
    }

    #[test]
    fn test_image_content_type() {
        assert_eq!(image_content_type("foto.JPG").unwrap(), "image/jpeg");
        assert_eq!(image_content_type("a.b.webp").unwrap(), "image/webp");
        assert!(matches!(
            image_content_type("catalogo.pdf"),
            Err(AdminError::Validation(_))
        ));
        assert!(matches!(
            image_content_type("sin-extension"),
            Err(AdminError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_image_without_sending() {
        let result = client()
            .upload_product_image(&ProductId::new("p-1"), "big.png", vec![0; MAX_IMAGE_BYTES + 1])
            .await;
        assert!(matches!(result, Err(AdminError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_update_rejected_without_sending() {
        let result = client()
            .update_product(&ProductId::new("p-1"), &ProductUpdate::default())
            .await;
        assert!(matches!(result, Err(AdminError::Validation(_))));
    }
}
