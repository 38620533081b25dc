// Shops

use std::sync::Arc;

use solarboard_api::{Page, Shop, ShopDraft, ShopPatch};

use super::{detail_id, detail_timing, optional};
use crate::console::Console;
use crate::error::CoreError;
use crate::query::{Filters, MutationDescriptor, keys};
use crate::stream::QueryStream;

impl Console {
    pub async fn shops(&self) -> Result<Arc<Page<Shop>>, CoreError> {
        let timing = self.config().cache.shops;
        self.query(&keys::SHOPS.list(&Filters::new()), timing, |api| async move {
            api.list_shops().await
        })
        .await
    }

    pub fn watch_shops(&self) -> QueryStream<Page<Shop>> {
        let timing = self.config().cache.shops;
        self.watch(&keys::SHOPS.list(&Filters::new()), timing, |api| async move {
            api.list_shops().await
        })
    }

    /// One shop. `None` or a blank id returns `Ok(None)` without a request.
    pub async fn shop(&self, id: Option<&str>) -> Result<Option<Arc<Shop>>, CoreError> {
        let id = detail_id(id);
        let timing = detail_timing(self.config().cache.shops, id);
        let owned = id.to_owned();
        optional(
            self.query(&keys::SHOPS.detail(id), timing, move |api| {
                let id = owned.clone();
                async move { api.get_shop(&id).await }
            })
            .await,
        )
    }

    pub async fn add_shop(&self, draft: &ShopDraft) -> Result<Shop, CoreError> {
        let descriptor = MutationDescriptor::add_shop();
        self.run_mutation(descriptor, self.api().add_shop(draft)).await
    }

    pub async fn update_shop(&self, id: &str, patch: &ShopPatch) -> Result<Shop, CoreError> {
        let descriptor = MutationDescriptor::update_shop(id);
        self.run_mutation(descriptor, self.api().update_shop(id, patch)).await
    }

    pub async fn delete_shop(&self, id: &str) -> Result<(), CoreError> {
        let descriptor = MutationDescriptor::delete_shop(id);
        self.run_mutation(descriptor, self.api().delete_shop(id)).await
    }
}

// ── Invalidation ──

impl MutationDescriptor {
    pub(crate) fn add_shop() -> Self {
        Self::created("add_shop", keys::SHOPS)
    }

    pub(crate) fn update_shop(id: &str) -> Self {
        Self::touched("update_shop", keys::SHOPS, id)
    }

    pub(crate) fn delete_shop(id: &str) -> Self {
        Self::touched("delete_shop", keys::SHOPS, id)
    }
}
