//! Flag-aware configuration resolution.
//!
//! Wraps `solarboard_config` so global CLI flags (`--profile`,
//! `--api-url`, `--insecure`, `--timeout`) override the profile before a
//! `ConsoleConfig` is built.

use std::sync::Arc;

use secrecy::SecretString;
use solarboard_config::{Config, FileSessionStore, Profile};
use solarboard_core::{Console, ConsoleConfig, TlsMode};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use solarboard_config::{config_path, load_config_or_default, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names, for help text.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Build the `ConsoleConfig` for this invocation.
///
/// A configured profile is the base; without one, `--api-url` alone is
/// enough to talk to a backend.
pub fn console_config(global: &GlobalOpts, cfg: &Config, profile_name: &str) -> Result<ConsoleConfig, CliError> {
    let mut config = if let Some(profile) = cfg.profiles.get(profile_name) {
        solarboard_config::profile_to_console_config(profile, profile_name, &cfg.defaults)?
    } else if let Some(ref raw) = global.api_url {
        ConsoleConfig::new(parse_api_url(raw)?)
    } else if global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name.into(),
            available: available_profiles(cfg),
        });
    } else {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    };

    if let Some(ref raw) = global.api_url {
        config.api_url = parse_api_url(raw)?;
    }
    if global.insecure {
        config.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(timeout) = global.timeout {
        config.timeout = Some(timeout);
    }
    // One-shot commands never live long enough to need a sweeper.
    config.gc_interval = None;

    Ok(config)
}

/// Construct a console backed by the profile's session file.
pub fn build_console(global: &GlobalOpts) -> Result<(Console, String), CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);
    let config = console_config(global, &cfg, &profile_name)?;

    let store = Arc::new(FileSessionStore::for_profile(&profile_name));
    tracing::debug!(
        profile = %profile_name,
        api_url = %config.api_url,
        session = %store.path().display(),
        "building console"
    );
    let console = Console::new(config, store).map_err(|e| CliError::from(e).for_profile(&profile_name))?;
    Ok((console, profile_name))
}

/// Email and password for `login`: flag or profile email, then the
/// password chain, then an interactive prompt.
pub fn login_credentials(
    email_flag: Option<String>,
    profile: Option<&Profile>,
    profile_name: &str,
) -> Result<(String, SecretString), CliError> {
    let email = email_flag
        .filter(|e| !e.trim().is_empty())
        .or_else(|| profile.and_then(solarboard_config::resolve_email))
        .ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.into(),
        })?;

    let password = match profile {
        Some(p) => solarboard_config::resolve_password(p, profile_name),
        None => solarboard_config::resolve_password(&Profile::default(), profile_name),
    };
    let password = match password {
        Some(pw) => pw,
        None => SecretString::from(
            rpassword::prompt_password(format!("Password for {email}: ")).map_err(|e| {
                CliError::Validation {
                    field: "password".into(),
                    reason: format!("prompt failed: {e}"),
                }
            })?,
        ),
    };

    Ok((email, password))
}

fn parse_api_url(raw: &str) -> Result<url::Url, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "api-url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}
