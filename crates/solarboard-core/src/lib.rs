// solarboard-core: query cache and data-synchronization layer between
// solarboard-api and consumers (CLI, dashboards).

pub mod command;
pub mod config;
pub mod console;
pub mod error;
mod hooks;
pub mod query;
pub mod session;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{CachePolicy, ConsoleConfig, QueryTiming, UploadConfig};
pub use console::Console;
pub use error::CoreError;
pub use query::{FetchStatus, Filters, MutationDescriptor, QueryCache, QueryKey, keys};
pub use session::AuthState;
pub use stream::{QuerySnapshot, QueryStream, QueryWatchStream};

// Record types and session plumbing consumers need alongside the console.
pub use solarboard_api::{
    Activity, Ad, AdDraft, AdPatch, AdminUser, DashboardAnalytics, DashboardCounts, Engineer,
    EngineerDraft, EngineerPatch, MediaKind, MemorySessionStore, Page, Product, ProductStatus,
    ProductStatusUpdate, Session, SessionStore, Shop, ShopDraft, ShopPatch, TlsMode, UploadFile,
};
