// Ads: list, create, update, delete. Image files are uploaded before the
// record is written.

use std::sync::Arc;

use solarboard_api::{Ad, AdDraft, AdPatch, Page, UploadFile};

use crate::console::Console;
use crate::error::CoreError;
use crate::query::{Filters, MutationDescriptor, keys};
use crate::stream::QueryStream;

impl Console {
    pub async fn ads(&self) -> Result<Arc<Page<Ad>>, CoreError> {
        let timing = self.config().cache.ads;
        self.query(&keys::ADS.list(&Filters::new()), timing, |api| async move {
            api.list_ads().await
        })
        .await
    }

    pub fn watch_ads(&self) -> QueryStream<Page<Ad>> {
        let timing = self.config().cache.ads;
        self.watch(&keys::ADS.list(&Filters::new()), timing, |api| async move {
            api.list_ads().await
        })
    }

    /// Create an ad, uploading `image` first when given.
    pub async fn create_ad(&self, draft: AdDraft, image: Option<UploadFile>) -> Result<Ad, CoreError> {
        let descriptor = MutationDescriptor::create_ad();
        match image {
            None => self.run_mutation(descriptor, self.api().create_ad(&draft)).await,
            Some(file) => {
                let uploader = self.uploader()?;
                let write = self.api().create_ad_with_image(uploader, draft, Some(file));
                self.run_mutation(descriptor, write).await
            }
        }
    }

    /// Update an ad. A failed image upload leaves the record untouched.
    pub async fn update_ad(
        &self,
        id: &str,
        patch: AdPatch,
        image: Option<UploadFile>,
    ) -> Result<Ad, CoreError> {
        let descriptor = MutationDescriptor::update_ad(id);
        match image {
            None => self.run_mutation(descriptor, self.api().update_ad(id, &patch)).await,
            Some(file) => {
                let uploader = self.uploader()?;
                let write = self.api().update_ad_with_image(uploader, id, patch, Some(file));
                self.run_mutation(descriptor, write).await
            }
        }
    }

    pub async fn delete_ad(&self, id: &str) -> Result<(), CoreError> {
        let descriptor = MutationDescriptor::delete_ad(id);
        self.run_mutation(descriptor, self.api().delete_ad(id)).await
    }
}

// ── Invalidation ──

impl MutationDescriptor {
    pub(crate) fn create_ad() -> Self {
        Self::created("create_ad", keys::ADS)
    }

    pub(crate) fn update_ad(id: &str) -> Self {
        Self::touched("update_ad", keys::ADS, id)
    }

    pub(crate) fn delete_ad(id: &str) -> Self {
        Self::touched("delete_ad", keys::ADS, id)
    }
}
