// ── Core error types ──
//
// User-facing errors from solarboard-core. `Clone`, because one failed
// fetch is handed to every caller coalesced onto it. The
// `From<solarboard_api::Error>` impl keeps the API's already-normalized
// message and records its taxonomy bucket.

use solarboard_api::{ErrorKind, UploadFailure};
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Authentication ───────────────────────────────────────────────
    /// HTTP 401. Session and cache have already been purged.
    #[error("{message}")]
    Unauthorized { message: String },

    #[error("Not logged in")]
    NotLoggedIn,

    // ── Request errors ───────────────────────────────────────────────
    #[error("{message}")]
    Validation { field: String, message: String },

    /// Business error reported by the backend.
    #[error("{message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    #[error("{message}")]
    Transport { message: String },

    #[error("{message}")]
    Upload {
        reason: UploadFailure,
        message: String,
    },

    #[error("Unexpected response from server: {message}")]
    Decode { message: String },

    // ── Query errors ─────────────────────────────────────────────────
    #[error("Query {key} is disabled")]
    QueryDisabled { key: String },

    #[error("No fetcher registered for {key}")]
    UnknownQuery { key: String },

    /// The fetch was started before a cache purge; its result was dropped.
    #[error("Query {key} was cancelled")]
    Cancelled { key: String },

    #[error("Cached value for {key} has an unexpected type")]
    TypeMismatch { key: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Session storage error: {message}")]
    Storage { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Taxonomy bucket, for errors that came from the API layer.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Unauthorized { .. } | Self::NotLoggedIn => Some(ErrorKind::Authentication),
            Self::Validation { .. } => Some(ErrorKind::Validation),
            Self::Api { .. } => Some(ErrorKind::Server),
            Self::Transport { .. } | Self::Config { .. } => Some(ErrorKind::Transport),
            Self::Upload { .. } => Some(ErrorKind::Upload),
            Self::Decode { .. } => Some(ErrorKind::Decode),
            Self::Storage { .. } => Some(ErrorKind::Storage),
            Self::QueryDisabled { .. }
            | Self::UnknownQuery { .. }
            | Self::Cancelled { .. }
            | Self::TypeMismatch { .. }
            | Self::Internal(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::NotLoggedIn)
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::QueryDisabled { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<solarboard_api::Error> for CoreError {
    fn from(err: solarboard_api::Error) -> Self {
        use solarboard_api::Error as E;

        match err {
            E::Unauthorized { message } => Self::Unauthorized { message },
            E::Api { status, message } => Self::Api {
                message,
                status: Some(status),
            },
            E::Transport { message, .. } => Self::Transport { message },
            E::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            E::Tls(message) => Self::Config {
                message: format!("TLS error: {message}"),
            },
            E::Upload { reason, message } => Self::Upload { reason, message },
            E::Validation { field, reason } => Self::Validation {
                message: format!("Invalid {field}: {reason}"),
                field,
            },
            E::Deserialization { message, body: _ } => Self::Decode { message },
            E::Session(message) => Self::Storage { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_message_survives_conversion() {
        let err: CoreError = solarboard_api::Error::Api {
            status: 409,
            message: "Email already registered".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Email already registered");
        assert_eq!(err.kind(), Some(ErrorKind::Server));
    }

    #[test]
    fn validation_keeps_field() {
        let err: CoreError = solarboard_api::Error::Validation {
            field: "title".into(),
            reason: "is required".into(),
        }
        .into();
        assert!(matches!(&err, CoreError::Validation { field, .. } if field == "title"));
        assert_eq!(err.to_string(), "Invalid title: is required");
    }
}
