// Engineers. The backend has no single-engineer endpoint; updates still
// invalidate the detail key so any value seeded under it is dropped.

use std::sync::Arc;

use solarboard_api::{Engineer, EngineerDraft, EngineerPatch, Page};

use crate::console::Console;
use crate::error::CoreError;
use crate::query::{Filters, MutationDescriptor, keys};
use crate::stream::QueryStream;

impl Console {
    pub async fn engineers(&self) -> Result<Arc<Page<Engineer>>, CoreError> {
        let timing = self.config().cache.engineers;
        self.query(&keys::ENGINEERS.list(&Filters::new()), timing, |api| async move {
            api.list_engineers().await
        })
        .await
    }

    pub fn watch_engineers(&self) -> QueryStream<Page<Engineer>> {
        let timing = self.config().cache.engineers;
        self.watch(&keys::ENGINEERS.list(&Filters::new()), timing, |api| async move {
            api.list_engineers().await
        })
    }

    pub async fn add_engineer(&self, draft: &EngineerDraft) -> Result<Engineer, CoreError> {
        let descriptor = MutationDescriptor::add_engineer();
        self.run_mutation(descriptor, self.api().add_engineer(draft)).await
    }

    pub async fn update_engineer(&self, id: &str, patch: &EngineerPatch) -> Result<Engineer, CoreError> {
        let descriptor = MutationDescriptor::update_engineer(id);
        self.run_mutation(descriptor, self.api().update_engineer(id, patch)).await
    }

    pub async fn delete_engineer(&self, id: &str) -> Result<(), CoreError> {
        let descriptor = MutationDescriptor::delete_engineer(id);
        self.run_mutation(descriptor, self.api().delete_engineer(id)).await
    }
}

// ── Invalidation ──

impl MutationDescriptor {
    pub(crate) fn add_engineer() -> Self {
        Self::created("add_engineer", keys::ENGINEERS)
    }

    pub(crate) fn update_engineer(id: &str) -> Self {
        Self::touched("update_engineer", keys::ENGINEERS, id)
    }

    pub(crate) fn delete_engineer(id: &str) -> Self {
        Self::touched("delete_engineer", keys::ENGINEERS, id)
    }
}
