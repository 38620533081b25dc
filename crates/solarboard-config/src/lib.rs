//! Shared configuration for solarboard tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! the on-disk session store, and translation to
//! `solarboard_core::ConsoleConfig`. The CLI adds flag-aware wrappers on top.

mod session;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use solarboard_core::{CachePolicy, ConsoleConfig, QueryTiming, TlsMode, UploadConfig};

pub use session::FileSessionStore;

/// Keyring service name for stored secrets.
pub const KEYRING_SERVICE: &str = "solarboard";

/// Env var prefix for config overrides (`SOLARBOARD_DEFAULTS__OUTPUT=json`).
pub const ENV_PREFIX: &str = "SOLARBOARD_";

const PASSWORD_ENV: &str = "SOLARBOARD_PASSWORD";
const EMAIL_ENV: &str = "SOLARBOARD_EMAIL";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' sets upload_url but no upload key")]
    NoUploadKey { profile: String },

    #[error("profile '{0}' not found")]
    UnknownProfile(String),

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring(err.to_string())
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Client-side request timeout, e.g. `"30s"`. Unset means none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// A named backend profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// API host root, e.g. "https://api.solar-market.example".
    pub api_url: String,

    /// Full URL of the media upload endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<String>,

    /// Upload API key (plaintext, prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_key: Option<String>,

    /// Environment variable holding the upload API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_key_env: Option<String>,

    /// Admin login email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Admin password (plaintext, prefer keyring).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// How often idle cache entries are swept, e.g. `"1m"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gc_interval: Option<String>,

    #[serde(default, skip_serializing_if = "CacheOverrides::is_empty")]
    pub cache: CacheOverrides,
}

/// Per-resource stale-time overrides, as humantime strings (`"90s"`, `"5m"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ads: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shops: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engineers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<String>,
}

impl CacheOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply these overrides on top of `policy`.
    pub fn apply(&self, policy: &mut CachePolicy) -> Result<(), ConfigError> {
        let slots: [(&str, &Option<String>, &mut QueryTiming); 7] = [
            ("cache.ads", &self.ads, &mut policy.ads),
            ("cache.shops", &self.shops, &mut policy.shops),
            ("cache.engineers", &self.engineers, &mut policy.engineers),
            ("cache.products", &self.products, &mut policy.products),
            ("cache.counts", &self.counts, &mut policy.counts),
            ("cache.analytics", &self.analytics, &mut policy.analytics),
            ("cache.activities", &self.activities, &mut policy.activities),
        ];
        for (field, value, timing) in slots {
            if let Some(raw) = value {
                timing.stale_time = parse_duration(field, raw)?;
            }
        }
        Ok(())
    }
}

/// Parse a humantime duration such as `"5m"` or `"90s"`.
pub fn parse_duration(field: &str, raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("'{raw}' is not a duration ({e})"),
    })
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "solarboard", "solarboard")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || fallback_dir(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding per-profile session files.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || fallback_dir(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

/// Session file for `profile`.
pub fn session_path(profile: &str) -> PathBuf {
    data_dir().join("sessions").join(format!("{profile}.json"))
}

fn fallback_dir(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("solarboard");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, still layering `SOLARBOARD_*` env vars on top.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str, secret: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/{secret}"),
    )?)
}

fn keyring_secret(profile_name: &str, secret: &str) -> Option<SecretString> {
    keyring_entry(profile_name, secret)
        .ok()?
        .get_password()
        .ok()
        .map(SecretString::from)
}

/// Admin email: profile, then `SOLARBOARD_EMAIL`.
pub fn resolve_email(profile: &Profile) -> Option<String> {
    profile
        .email
        .clone()
        .or_else(|| std::env::var(EMAIL_ENV).ok())
        .filter(|e| !e.trim().is_empty())
}

/// Admin password: `SOLARBOARD_PASSWORD`, keyring, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Env var
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Some(SecretString::from(pw));
    }

    // 2. Keyring
    if let Some(pw) = keyring_secret(profile_name, "password") {
        return Some(pw);
    }

    // 3. Plaintext in config
    profile.password.clone().map(SecretString::from)
}

/// Email and password together, or `NoCredentials`.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let no_credentials = || ConfigError::NoCredentials {
        profile: profile_name.into(),
    };
    let email = resolve_email(profile).ok_or_else(no_credentials)?;
    let password = resolve_password(profile, profile_name).ok_or_else(no_credentials)?;
    Ok((email, password))
}

/// Upload key: the profile's env var, keyring, then plaintext.
pub fn resolve_upload_key(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    if let Some(ref env_name) = profile.upload_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    if let Some(key) = keyring_secret(profile_name, "upload-key") {
        return Some(key);
    }

    profile.upload_key.clone().map(SecretString::from)
}

/// Store the admin password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name, "password")?.set_password(password.expose_secret())?;
    Ok(())
}

/// Store the upload API key in the system keyring.
pub fn store_upload_key(profile_name: &str, key: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name, "upload-key")?.set_password(key.expose_secret())?;
    Ok(())
}

// ── Translation to core config ──────────────────────────────────────

fn parse_url(field: &str, raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })
}

/// TLS mode for a profile: `insecure` wins over `ca_cert`.
pub fn tls_mode(profile: &Profile, defaults: &Defaults) -> TlsMode {
    if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    }
}

/// Build a `ConsoleConfig` from a profile, with no CLI flag overrides.
pub fn profile_to_console_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConsoleConfig, ConfigError> {
    let mut config = ConsoleConfig::new(parse_url("api_url", &profile.api_url)?);

    if let Some(ref raw) = profile.upload_url {
        let endpoint = parse_url("upload_url", raw)?;
        let api_key =
            resolve_upload_key(profile, profile_name).ok_or_else(|| ConfigError::NoUploadKey {
                profile: profile_name.into(),
            })?;
        config.upload = Some(UploadConfig { endpoint, api_key });
    }

    config.tls = tls_mode(profile, defaults);
    config.timeout = profile
        .timeout
        .as_deref()
        .or(defaults.timeout.as_deref())
        .map(|raw| parse_duration("timeout", raw))
        .transpose()?;

    if let Some(ref raw) = profile.gc_interval {
        config.gc_interval = Some(parse_duration("gc_interval", raw)?);
    }
    profile.cache.apply(&mut config.cache)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "prod"

[defaults]
output = "json"
timeout = "20s"

[profiles.prod]
api_url = "https://api.solar-market.example"
upload_url = "https://media.solar-market.example/storage/upload"
upload_key = "plain-key"
email = "admin@solar.eg"

[profiles.prod.cache]
ads = "90s"
analytics = "30m"

[profiles.local]
api_url = "http://localhost:5000"
insecure = true
timeout = "2m"
"#;

    fn write_sample(dir: &Path) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn loads_profiles_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&write_sample(dir.path())).unwrap();

        assert_eq!(cfg.default_profile.as_deref(), Some("prod"));
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "auto");
        assert_eq!(cfg.profiles.len(), 2);
        assert_eq!(cfg.profile("local").unwrap().insecure, Some(true));
        assert!(matches!(
            cfg.profile("staging"),
            Err(ConfigError::UnknownProfile(_))
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn profile_translates_to_console_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&write_sample(dir.path())).unwrap();

        let prod = profile_to_console_config(cfg.profile("prod").unwrap(), "prod", &cfg.defaults)
            .unwrap();
        assert_eq!(prod.api_url.as_str(), "https://api.solar-market.example/");
        assert!(prod.upload.is_some());
        assert_eq!(prod.timeout, Some(Duration::from_secs(20)));
        assert_eq!(prod.cache.ads.stale_time, Duration::from_secs(90));
        assert_eq!(prod.cache.analytics.stale_time, Duration::from_secs(1800));
        // Overriding the window does not enable a disabled query.
        assert!(!prod.cache.analytics.enabled);
        assert!(matches!(prod.tls, TlsMode::System));

        let local =
            profile_to_console_config(cfg.profile("local").unwrap(), "local", &cfg.defaults)
                .unwrap();
        assert!(matches!(local.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(local.timeout, Some(Duration::from_secs(120)));
        assert!(local.upload.is_none());
    }

    #[test]
    fn bad_duration_names_the_field() {
        let profile = Profile {
            api_url: "https://api.example".into(),
            cache: CacheOverrides {
                shops: Some("soon".into()),
                ..CacheOverrides::default()
            },
            ..Profile::default()
        };
        let err = profile_to_console_config(&profile, "p", &Defaults::default()).unwrap_err();
        assert!(err.to_string().starts_with("invalid cache.shops"));
    }

    #[test]
    fn bad_url_is_rejected() {
        let profile = Profile {
            api_url: "not a url".into(),
            ..Profile::default()
        };
        let err = profile_to_console_config(&profile, "p", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_url"));
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                api_url: "https://api.example".into(),
                email: Some("ops@solar.eg".into()),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("upload_key"));
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }
}
