// Advertisement endpoints
//
// Ads carry an optional hosted image. The `*_with_image` helpers upload
// first and only write the record once the upload has produced a URL.

use crate::client::{ApiClient, Payload};
use crate::error::Error;
use crate::models::{Ad, AdDraft, AdPatch, Page};
use crate::upload::{MediaUploader, UploadFile};
use crate::validate::{reject_blank, require};

impl ApiClient {
    pub async fn list_ads(&self) -> Result<Page<Ad>, Error> {
        let payload = self.get("ads/get/allAds", "Failed to fetch ads").await?;
        Ok(payload.into_page())
    }

    /// Create an ad. `title` and `description` must be non-empty.
    pub async fn create_ad(&self, draft: &AdDraft) -> Result<Ad, Error> {
        validate_draft(draft)?;
        let payload = self.post("ads/postads", draft, "Failed to add ad").await?;
        Ok(payload.data)
    }

    pub async fn update_ad(&self, id: &str, patch: &AdPatch) -> Result<Ad, Error> {
        validate_patch(id, patch)?;
        let payload = self
            .put(&format!("ads/update/{id}"), patch, "Failed to update ad")
            .await?;
        Ok(payload.data)
    }

    pub async fn delete_ad(&self, id: &str) -> Result<(), Error> {
        require("id", id)?;
        let _: Payload<serde_json::Value> = self
            .delete(&format!("ads/delete/{id}"), "Failed to delete ad")
            .await?;
        Ok(())
    }

    /// Upload `image` (if any), merge its URL into `imageUrl`, then create.
    pub async fn create_ad_with_image<U: MediaUploader>(
        &self,
        uploader: &U,
        mut draft: AdDraft,
        image: Option<UploadFile>,
    ) -> Result<Ad, Error> {
        validate_draft(&draft)?;
        if let Some(file) = image {
            draft.image_url = uploader.upload(file).await?;
        }
        self.create_ad(&draft).await
    }

    /// Upload `image` (if any), merge its URL into `imageUrl`, then update.
    ///
    /// A failed upload returns before the ad record is touched.
    pub async fn update_ad_with_image<U: MediaUploader>(
        &self,
        uploader: &U,
        id: &str,
        mut patch: AdPatch,
        image: Option<UploadFile>,
    ) -> Result<Ad, Error> {
        validate_patch(id, &patch)?;
        if let Some(file) = image {
            patch.image_url = Some(uploader.upload(file).await?);
        }
        self.update_ad(id, &patch).await
    }
}

fn validate_draft(draft: &AdDraft) -> Result<(), Error> {
    require("title", &draft.title)?;
    require("description", &draft.description)
}

fn validate_patch(id: &str, patch: &AdPatch) -> Result<(), Error> {
    require("id", id)?;
    reject_blank("title", patch.title.as_deref())?;
    reject_blank("description", patch.description.as_deref())
}
