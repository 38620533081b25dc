//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use solarboard_config::ConfigError;
use solarboard_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the API: {message}")]
    #[diagnostic(
        code(solarboard::connection_failed),
        help(
            "Check the API URL and your network.\n\
             A self-signed certificate needs --insecure (-k) or ca_cert in the profile."
        )
    )]
    ConnectionFailed { message: String },

    #[error("Request timed out: {message}")]
    #[diagnostic(
        code(solarboard::timeout),
        help("Increase the timeout with --timeout or the profile's timeout setting.")
    )]
    Timeout { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(solarboard::auth_failed),
        help("Sign in again with: solarboard login --profile {profile}")
    )]
    AuthFailed { profile: String, message: String },

    #[error("Not logged in")]
    #[diagnostic(
        code(solarboard::not_logged_in),
        help("Sign in first with: solarboard login --profile {profile}")
    )]
    NotLoggedIn { profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(solarboard::no_credentials),
        help(
            "Pass --email, set SOLARBOARD_EMAIL and SOLARBOARD_PASSWORD,\n\
             or store a password with: solarboard config set-password"
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(solarboard::not_found),
        help("Run: solarboard {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(solarboard::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    #[error("Upload failed: {message}")]
    #[diagnostic(
        code(solarboard::upload),
        help("Images must be under 5 MB and videos under 100 MB.")
    )]
    Upload { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(solarboard::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(solarboard::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: solarboard config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(solarboard::no_config),
        help(
            "Create one with: solarboard config init\n\
             Or pass --api-url. Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(solarboard::config))]
    Config(ConfigError),

    // ── IO / Internal ────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    #[diagnostic(code(solarboard::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NotLoggedIn { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. }
            | Self::ApiError {
                status: Some(404), ..
            } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the active profile name to auth errors raised by core.
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                profile: name.into(),
                message,
            },
            Self::NotLoggedIn { .. } => Self::NotLoggedIn {
                profile: name.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized { message } => Self::AuthFailed {
                profile: "default".into(),
                message,
            },
            CoreError::NotLoggedIn => Self::NotLoggedIn {
                profile: "default".into(),
            },
            CoreError::Validation { field, message } => Self::Validation {
                field,
                reason: message,
            },
            CoreError::Api { message, status } => Self::ApiError { message, status },
            CoreError::Transport { message } => {
                if message.to_ascii_lowercase().contains("timed out") {
                    Self::Timeout { message }
                } else {
                    Self::ConnectionFailed { message }
                }
            }
            CoreError::Upload { message, .. } => Self::Upload { message },
            CoreError::Config { message } | CoreError::Storage { message } => {
                Self::Internal(message)
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_exits_with_auth_code() {
        let err = CliError::from(CoreError::Unauthorized {
            message: "Session expired".into(),
        })
        .for_profile("prod");
        assert_eq!(err.exit_code(), exit_code::AUTH);
        assert_eq!(err.to_string(), "Session expired");
        assert!(matches!(err, CliError::AuthFailed { ref profile, .. } if profile == "prod"));
    }

    #[test]
    fn server_message_is_shown_verbatim() {
        let err = CliError::from(CoreError::Api {
            message: "Email already registered".into(),
            status: Some(409),
        });
        assert_eq!(err.to_string(), "Email already registered");
        assert_eq!(err.exit_code(), exit_code::GENERAL);

        let missing = CliError::from(CoreError::Api {
            message: "Shop not found".into(),
            status: Some(404),
        });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);
    }

    #[test]
    fn transport_timeouts_get_their_own_code() {
        let err = CliError::from(CoreError::Transport {
            message: "Request timed out".into(),
        });
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);

        let err = CliError::from(CoreError::Transport {
            message: "connection refused".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }
}
