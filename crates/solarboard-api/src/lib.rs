// solarboard-api: Async Rust client for the solar-marketplace admin API
//
// One `ApiClient` covers every resource; endpoint groups live in their
// own modules as inherent methods. Media goes through `UploadClient`.

pub mod ads;
pub mod auth;
pub mod client;
pub mod dashboard;
pub mod engineers;
pub mod error;
pub mod models;
pub mod products;
pub mod session;
pub mod shops;
pub mod transport;
pub mod upload;
mod validate;

pub use client::ApiClient;
pub use error::{Error, ErrorKind, UploadFailure, error_message};
pub use models::*;
pub use session::{MemorySessionStore, Session, SessionStore, bearer_value};
pub use transport::{TlsMode, TransportConfig};
pub use upload::{MediaKind, MediaUploader, UploadClient, UploadFile};
