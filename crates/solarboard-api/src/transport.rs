// reqwest client construction shared by `ApiClient` and `UploadClient`.
//
// Both talk to hosts the same profile configures, so TLS trust and the
// optional request deadline are decided once here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::error::Error;

const USER_AGENT: &str = concat!("solarboard/", env!("CARGO_PKG_VERSION"));

/// How server certificates are verified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Platform trust store.
    #[default]
    System,
    /// Trust the PEM bundle at this path in addition to the platform store.
    CustomCa(PathBuf),
    /// Skip verification. Local backends with self-signed certs only.
    DangerAcceptInvalid,
}

/// Settings applied to every HTTP client this crate builds.
///
/// `timeout` defaults to `None`: CRUD calls run without a client-side
/// deadline. Uploads set their own per-request limit.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Option<Duration>,
}

impl TransportConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        self.build_client_with_headers(HeaderMap::new())
    }

    /// Same as [`build_client`](Self::build_client), with headers sent on
    /// every request (the media host's `x-api-key`).
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);

        if let Some(limit) = self.timeout {
            builder = builder.timeout(limit);
        }

        builder = match &self.tls {
            TlsMode::System => builder,
            TlsMode::CustomCa(path) => builder.add_root_certificate(load_ca(path)?),
            TlsMode::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        };

        builder
            .build()
            .map_err(|e| Error::Tls(format!("cannot initialise HTTP client: {e}")))
    }
}

fn load_ca(path: &Path) -> Result<reqwest::Certificate, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("cannot read CA bundle {}: {e}", path.display())))?;
    reqwest::Certificate::from_pem(&pem)
        .map_err(|e| Error::Tls(format!("{} is not a PEM certificate: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn missing_ca_bundle_is_a_tls_error() {
        let cfg = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/solarboard-ca.pem")),
            timeout: None,
        };
        let err = cfg.build_client().unwrap_err();
        assert!(matches!(err, Error::Tls(ref msg) if msg.contains("solarboard-ca.pem")));
    }
}
