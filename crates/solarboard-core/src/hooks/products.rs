// Products: browse, inspect, moderate.

use std::sync::Arc;

use solarboard_api::{Page, Product, ProductStatusUpdate};

use super::{detail_id, detail_timing, optional};
use crate::console::Console;
use crate::error::CoreError;
use crate::query::{Filters, MutationDescriptor, keys};
use crate::stream::QueryStream;

impl Console {
    pub async fn products(&self) -> Result<Arc<Page<Product>>, CoreError> {
        let timing = self.config().cache.products;
        self.query(&keys::PRODUCTS.list(&Filters::new()), timing, |api| async move {
            api.list_products().await
        })
        .await
    }

    pub fn watch_products(&self) -> QueryStream<Page<Product>> {
        let timing = self.config().cache.products;
        self.watch(&keys::PRODUCTS.list(&Filters::new()), timing, |api| async move {
            api.list_products().await
        })
    }

    /// One product. `None` or a blank id returns `Ok(None)` without a request.
    pub async fn product(&self, id: Option<&str>) -> Result<Option<Arc<Product>>, CoreError> {
        let id = detail_id(id);
        let timing = detail_timing(self.config().cache.products, id);
        let owned = id.to_owned();
        optional(
            self.query(&keys::PRODUCTS.detail(id), timing, move |api| {
                let id = owned.clone();
                async move { api.get_product(&id).await }
            })
            .await,
        )
    }

    /// Approve or reject a product, then write the returned record
    /// straight into its detail entry.
    pub async fn update_product_status(
        &self,
        id: &str,
        update: &ProductStatusUpdate,
    ) -> Result<Product, CoreError> {
        let descriptor = MutationDescriptor::update_product_status(id);
        let product = self
            .run_mutation(descriptor, self.api().update_product_status(id, update))
            .await?;
        self.cache()
            .set_query_data(&keys::PRODUCTS.detail(id), product.clone());
        Ok(product)
    }

    pub async fn approve_product(&self, id: &str) -> Result<Product, CoreError> {
        self.update_product_status(id, &ProductStatusUpdate::approve())
            .await
    }

    pub async fn reject_product(&self, id: &str, reason: &str) -> Result<Product, CoreError> {
        self.update_product_status(id, &ProductStatusUpdate::reject(reason))
            .await
    }
}

// ── Invalidation ──

impl MutationDescriptor {
    pub(crate) fn update_product_status(id: &str) -> Self {
        Self::touched("update_product_status", keys::PRODUCTS, id)
    }
}
