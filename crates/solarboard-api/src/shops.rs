// Shop endpoints

use crate::client::{ApiClient, Payload};
use crate::error::Error;
use crate::models::{Page, Shop, ShopDraft, ShopPatch};
use crate::validate::{reject_blank, require};

impl ApiClient {
    pub async fn list_shops(&self) -> Result<Page<Shop>, Error> {
        let payload = self
            .get("marketplace/getAllShops", "Failed to fetch shops")
            .await?;
        Ok(payload.into_page())
    }

    pub async fn get_shop(&self, id: &str) -> Result<Shop, Error> {
        require("id", id)?;
        let payload = self
            .get(
                &format!("marketplace/getOneShop/{id}"),
                "Failed to fetch shop details",
            )
            .await?;
        Ok(payload.data)
    }

    /// Create a shop. `name`, `owner_name` and `email` must be non-empty.
    pub async fn add_shop(&self, draft: &ShopDraft) -> Result<Shop, Error> {
        require("name", &draft.name)?;
        require("ownerName", &draft.owner_name)?;
        require("email", &draft.email)?;

        let payload = self.post("shops/add", draft, "Failed to add shop").await?;
        Ok(payload.data)
    }

    pub async fn update_shop(&self, id: &str, patch: &ShopPatch) -> Result<Shop, Error> {
        require("id", id)?;
        reject_blank("name", patch.name.as_deref())?;
        reject_blank("ownerName", patch.owner_name.as_deref())?;
        reject_blank("email", patch.email.as_deref())?;

        let payload = self
            .put(&format!("shops/update/{id}"), patch, "Failed to update shop")
            .await?;
        Ok(payload.data)
    }

    pub async fn delete_shop(&self, id: &str) -> Result<(), Error> {
        require("id", id)?;
        let _: Payload<serde_json::Value> = self
            .delete(&format!("shops/delete/{id}"), "Failed to delete shop")
            .await?;
        Ok(())
    }
}
