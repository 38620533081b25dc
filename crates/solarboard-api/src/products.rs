// Product moderation endpoints
//
// Products are created by marketplace sellers; the admin side only reads
// them and moves them between pending, approved and rejected.

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Page, Product, ProductStatus, ProductStatusUpdate};
use crate::validate::require;

impl ApiClient {
    pub async fn list_products(&self) -> Result<Page<Product>, Error> {
        let payload = self
            .get("marketplace/browse-products", "Failed to fetch products")
            .await?;
        Ok(payload.into_page())
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, Error> {
        require("id", id)?;
        let payload = self
            .get(
                &format!("marketplace/getOneProduct/{id}"),
                "Failed to fetch product details",
            )
            .await?;
        Ok(payload.data)
    }

    /// Change a product's moderation status.
    ///
    /// Rejections must carry a non-empty reason.
    pub async fn update_product_status(
        &self,
        id: &str,
        update: &ProductStatusUpdate,
    ) -> Result<Product, Error> {
        require("id", id)?;
        if update.status == ProductStatus::Rejected {
            require(
                "rejectionReason",
                update.rejection_reason.as_deref().unwrap_or_default(),
            )?;
        }

        let payload = self
            .put(
                &format!("products/update-product/{id}"),
                update,
                "Failed to update product",
            )
            .await?;
        Ok(payload.data)
    }
}
