// Engineer directory endpoints
//
// Listing goes through the public marketplace route; writes go through the
// admin `engineers/*` routes. There is no single-engineer read endpoint.

use crate::client::{ApiClient, Payload};
use crate::error::Error;
use crate::models::{Engineer, EngineerDraft, EngineerPatch, Page};
use crate::validate::{reject_blank, require};

impl ApiClient {
    pub async fn list_engineers(&self) -> Result<Page<Engineer>, Error> {
        let payload = self
            .get("marketplace/getAllEngineer", "Failed to fetch engineers")
            .await?;
        Ok(payload.into_page())
    }

    /// Create an engineer. `name`, `email` and `phone` must be non-empty.
    pub async fn add_engineer(&self, draft: &EngineerDraft) -> Result<Engineer, Error> {
        require("name", &draft.name)?;
        require("email", &draft.email)?;
        require("phone", &draft.phone)?;

        let payload = self
            .post("engineers/add", draft, "Failed to add engineer")
            .await?;
        Ok(payload.data)
    }

    pub async fn update_engineer(&self, id: &str, patch: &EngineerPatch) -> Result<Engineer, Error> {
        require("id", id)?;
        reject_blank("name", patch.name.as_deref())?;
        reject_blank("email", patch.email.as_deref())?;
        reject_blank("phone", patch.phone.as_deref())?;

        let payload = self
            .put(
                &format!("engineers/update/{id}"),
                patch,
                "Failed to update engineer",
            )
            .await?;
        Ok(payload.data)
    }

    pub async fn delete_engineer(&self, id: &str) -> Result<(), Error> {
        require("id", id)?;
        let _: Payload<serde_json::Value> = self
            .delete(&format!("engineers/delete/{id}"), "Failed to delete engineer")
            .await?;
        Ok(())
    }
}
