//! Config subcommand handlers.

use dialoguer::{Input, Select};
use secrecy::SecretString;
use solarboard_config::{Config, Defaults, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
        if profile.upload_key.is_some() {
            profile.upload_key = Some(MASK.into());
        }
    }
    cfg
}

/// TOML view of an already-redacted config.
fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# cannot render config: {e}"))
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_secret(label: &str) -> Result<SecretString, CliError> {
    let secret = rpassword::prompt_password(label).map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: "secret".into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(SecretString::from(secret))
}

/// Offer the keyring or plaintext config for a secret.
///
/// Returns `Some(secret)` for plaintext, `None` once stored in the keyring.
fn prompt_keyring_storage(
    secret: &SecretString,
    store: impl FnOnce(&SecretString) -> Result<(), solarboard_config::ConfigError>,
    label: &str,
) -> Result<Option<String>, CliError> {
    use secrecy::ExposeSecret;

    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {label}?"))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        store(secret)?;
        eprintln!("   ✓ {label} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret.expose_secret().to_owned()))
    }
}

fn profile_or_err<'a>(cfg: &'a Config, name: &str) -> Result<&'a Profile, CliError> {
    cfg.profiles.get(name).ok_or_else(|| CliError::ProfileNotFound {
        name: name.into(),
        available: config::available_profiles(cfg),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("☀ solarboard configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("API URL")
                .default("https://api.example.com".into())
                .interact_text()
                .map_err(prompt_err)?;
            if api_url.parse::<url::Url>().is_err() {
                return Err(CliError::Validation {
                    field: "api_url".into(),
                    reason: format!("invalid URL: {api_url}"),
                });
            }

            let email: String = Input::new()
                .with_prompt("Admin email")
                .interact_text()
                .map_err(prompt_err)?;

            let password = prompt_secret("Password: ")?;
            let password = prompt_keyring_storage(
                &password,
                |pw| solarboard_config::store_password(&profile_name, pw),
                "password",
            )?;

            let upload_url: String = Input::new()
                .with_prompt("Media upload URL (blank to disable image uploads)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            let (upload_url, upload_key) = if upload_url.trim().is_empty() {
                (None, None)
            } else {
                let key = prompt_secret("Upload API key: ")?;
                let key = prompt_keyring_storage(
                    &key,
                    |k| solarboard_config::store_upload_key(&profile_name, k),
                    "upload key",
                )?;
                (Some(upload_url), key)
            };

            let profile = Profile {
                api_url,
                upload_url,
                upload_key,
                email: Some(email),
                password,
                ..Profile::default()
            };

            let mut cfg = config::load_config_or_default();
            if cfg.profiles.is_empty() {
                cfg.defaults = Defaults::default();
            }
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            let path = config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Next: solarboard login");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                c.default_profile.clone().unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: solarboard config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            profile_or_err(&cfg, &name)?;
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── Keyring secrets ─────────────────────────────────────────
        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            profile_or_err(&cfg, &name)?;

            let password = prompt_secret("Password: ")?;
            solarboard_config::store_password(&name, &password)?;
            eprintln!("✓ Password stored in system keyring for profile '{name}'");
            Ok(())
        }

        ConfigCommand::SetUploadKey { profile } => {
            let cfg = config::load_config_or_default();
            let name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            profile_or_err(&cfg, &name)?;

            let key = prompt_secret("Upload API key: ")?;
            solarboard_config::store_upload_key(&name, &key)?;
            eprintln!("✓ Upload key stored in system keyring for profile '{name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_masks_plaintext_secrets() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "prod".into(),
            Profile {
                api_url: "https://api.solar.example".into(),
                password: Some("hunter2".into()),
                upload_key: Some("media-key".into()),
                upload_key_env: Some("MEDIA_KEY".into()),
                ..Profile::default()
            },
        );

        let text = format_config(&redacted(&cfg));
        assert!(!text.contains("hunter2"));
        assert!(!text.contains("media-key"));
        assert!(text.contains(MASK));
        assert!(text.contains("MEDIA_KEY"));
    }
}
