use serde_json::Value;
use thiserror::Error;

/// Which part of the error taxonomy a failure belongs to.
///
/// Callers branch on this instead of matching every [`Error`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Network failure, DNS, TLS, bad URL.
    Transport,
    /// The backend rejected the session (HTTP 401) or the credentials.
    Authentication,
    /// A required field was missing, caught before any request was sent.
    Validation,
    /// The backend reported a business error in its response body.
    Server,
    /// Media upload failed (size, MIME type, timeout, rejection).
    Upload,
    /// The response could not be decoded into the expected shape.
    Decode,
    /// Local session storage failed.
    Storage,
}

/// Why a media upload was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum UploadFailure {
    TooLarge,
    UnsupportedType,
    Timeout,
    Rejected,
}

/// Top-level error type for the `solarboard-api` crate.
///
/// Every variant's `Display` is the single human-readable message the
/// caller should surface. Messages for failed responses are resolved
/// through [`error_message`], so all resource modules agree on them.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// HTTP 401. The session store has already been cleared.
    #[error("{message}")]
    Unauthorized { message: String },

    // ── Server ──────────────────────────────────────────────────────
    /// Non-success response or a `status: false` envelope.
    #[error("{message}")]
    Api { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Connection refused, DNS failure, reset, etc.
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS or client-construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Upload ──────────────────────────────────────────────────────
    #[error("{message}")]
    Upload {
        reason: UploadFailure,
        message: String,
    },

    // ── Validation ──────────────────────────────────────────────────
    /// Client-side validation failure; no request was sent.
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Storage ─────────────────────────────────────────────────────
    #[error("Session storage error: {0}")]
    Session(String),
}

impl Error {
    /// Taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Authentication,
            Self::Api { .. } => ErrorKind::Server,
            Self::Transport { .. } | Self::InvalidUrl(_) | Self::Tls(_) => ErrorKind::Transport,
            Self::Upload { .. } => ErrorKind::Upload,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Deserialization { .. } => ErrorKind::Decode,
            Self::Session(_) => ErrorKind::Storage,
        }
    }

    /// Returns `true` if the backend rejected the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` if this is a "not found" response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// HTTP status attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Api { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn validation(field: &str, reason: &str) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a transport failure, resolving its message through the
    /// shared precedence with no response body available.
    pub(crate) fn transport(source: reqwest::Error, fallback: &str) -> Self {
        let text = source.to_string();
        Self::Transport {
            message: error_message(None, Some(&text), fallback),
            source,
        }
    }
}

// ── Message normalization ───────────────────────────────────────────

/// Resolve the user-facing message for a failed call.
///
/// Precedence, first non-empty wins:
/// 1. `message` field of a JSON body
/// 2. `error` field of a JSON body
/// 3. the body itself when it is a plain string
/// 4. the transport-level message (e.g. `Request failed with status code 500`)
/// 5. `fallback`
pub fn error_message(body: Option<&str>, transport: Option<&str>, fallback: &str) -> String {
    body.and_then(message_from_body)
        .or_else(|| non_empty(transport))
        .unwrap_or_else(|| fallback.to_owned())
}

fn message_from_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => string_field(map.get("message"))
            .or_else(|| string_field(map.get("error"))),
        Ok(Value::String(s)) => non_empty(Some(&s)),
        // Other JSON values (numbers, arrays, null) carry no message.
        Ok(_) => None,
        Err(_) => Some(trimmed.to_owned()),
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => non_empty(Some(s)),
        // `{"error": {"message": "..."}}`
        Value::Object(inner) => string_field(inner.get("message")),
        _ => None,
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}
