// ── Command API ──
//
// Every write the console supports, as one enum. `Console::execute` routes
// each variant to its hook; `descriptor()` reports the same invalidation
// set the hook applies, since both read it from the hook module.

use std::path::PathBuf;

use solarboard_api::{
    Ad, AdDraft, AdPatch, Engineer, EngineerDraft, EngineerPatch, Product, Shop, ShopDraft,
    ShopPatch, UploadFile,
};

use crate::console::Console;
use crate::error::CoreError;
use crate::query::MutationDescriptor;

/// All write operations against the marketplace backend.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Engineers ────────────────────────────────────────────────────
    AddEngineer(EngineerDraft),
    UpdateEngineer { id: String, patch: EngineerPatch },
    DeleteEngineer { id: String },

    // ── Shops ────────────────────────────────────────────────────────
    AddShop(ShopDraft),
    UpdateShop { id: String, patch: ShopPatch },
    DeleteShop { id: String },

    // ── Products ─────────────────────────────────────────────────────
    ApproveProduct { id: String },
    RejectProduct { id: String, reason: String },

    // ── Ads ──────────────────────────────────────────────────────────
    CreateAd {
        draft: AdDraft,
        /// Image to upload before the ad is created.
        image: Option<PathBuf>,
    },
    UpdateAd {
        id: String,
        patch: AdPatch,
        image: Option<PathBuf>,
    },
    DeleteAd { id: String },
}

/// What a successful command produced.
#[derive(Debug, Clone)]
pub enum CommandResult {
    Ok,
    Engineer(Engineer),
    Shop(Shop),
    Product(Product),
    Ad(Ad),
}

impl Command {
    /// Key families this command invalidates when it succeeds.
    pub fn descriptor(&self) -> MutationDescriptor {
        match self {
            Self::AddEngineer(_) => MutationDescriptor::add_engineer(),
            Self::UpdateEngineer { id, .. } => MutationDescriptor::update_engineer(id),
            Self::DeleteEngineer { id } => MutationDescriptor::delete_engineer(id),
            Self::AddShop(_) => MutationDescriptor::add_shop(),
            Self::UpdateShop { id, .. } => MutationDescriptor::update_shop(id),
            Self::DeleteShop { id } => MutationDescriptor::delete_shop(id),
            Self::ApproveProduct { id } | Self::RejectProduct { id, .. } => {
                MutationDescriptor::update_product_status(id)
            }
            Self::CreateAd { .. } => MutationDescriptor::create_ad(),
            Self::UpdateAd { id, .. } => MutationDescriptor::update_ad(id),
            Self::DeleteAd { id } => MutationDescriptor::delete_ad(id),
        }
    }
}

impl Console {
    /// Run a command. Requires an authenticated session.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        self.require_login()?;
        tracing::debug!(mutation = cmd.descriptor().name, "executing command");

        match cmd {
            Command::AddEngineer(draft) => self.add_engineer(&draft).await.map(CommandResult::Engineer),
            Command::UpdateEngineer { id, patch } => self
                .update_engineer(&id, &patch)
                .await
                .map(CommandResult::Engineer),
            Command::DeleteEngineer { id } => {
                self.delete_engineer(&id).await.map(|()| CommandResult::Ok)
            }
            Command::AddShop(draft) => self.add_shop(&draft).await.map(CommandResult::Shop),
            Command::UpdateShop { id, patch } => {
                self.update_shop(&id, &patch).await.map(CommandResult::Shop)
            }
            Command::DeleteShop { id } => self.delete_shop(&id).await.map(|()| CommandResult::Ok),
            Command::ApproveProduct { id } => {
                self.approve_product(&id).await.map(CommandResult::Product)
            }
            Command::RejectProduct { id, reason } => self
                .reject_product(&id, &reason)
                .await
                .map(CommandResult::Product),
            Command::CreateAd { draft, image } => {
                let image = load_image(image).await?;
                self.create_ad(draft, image).await.map(CommandResult::Ad)
            }
            Command::UpdateAd { id, patch, image } => {
                let image = load_image(image).await?;
                self.update_ad(&id, patch, image).await.map(CommandResult::Ad)
            }
            Command::DeleteAd { id } => self.delete_ad(&id).await.map(|()| CommandResult::Ok),
        }
    }
}

async fn load_image(path: Option<PathBuf>) -> Result<Option<UploadFile>, CoreError> {
    match path {
        Some(path) => Ok(Some(UploadFile::from_path(&path).await?)),
        None => Ok(None),
    }
}
