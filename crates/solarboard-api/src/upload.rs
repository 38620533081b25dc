// Media upload client
//
// Posts files to the storage host as multipart `file` with an `x-api-key`
// header and returns the hosted `fileUrl`. Size limits and MIME allowlists
// are enforced before any bytes leave the machine.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, UploadFailure, error_message};
use crate::transport::TransportConfig;

const MIB: usize = 1024 * 1024;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "wmv", "flv", "webm", "m4v", "3gp"];

const IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/webp",
];
const VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-ms-wmv",
    "video/x-flv",
    "video/webm",
    "video/x-m4v",
    "video/3gpp",
];

/// What kind of media a file is, which decides its limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    File,
}

impl MediaKind {
    /// Classify by explicit MIME type first, then by file extension.
    pub fn detect(file_name: &str, mime: Option<&str>) -> Self {
        if let Some(mime) = mime {
            if mime.starts_with("video/") {
                return Self::Video;
            }
            if mime.starts_with("image/") {
                return Self::Image;
            }
        }

        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Image
        } else {
            Self::File
        }
    }

    pub fn max_bytes(self) -> usize {
        match self {
            Self::Image | Self::File => 10 * MIB,
            Self::Video => 50 * MIB,
        }
    }

    /// Client-side deadline. Only video uploads carry one.
    pub fn timeout(self) -> Option<Duration> {
        match self {
            Self::Video => Some(Duration::from_secs(300)),
            Self::Image | Self::File => None,
        }
    }

    fn allowed_types(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Image => Some(IMAGE_TYPES),
            Self::Video => Some(VIDEO_TYPES),
            Self::File => None,
        }
    }

    fn too_large_message(self) -> &'static str {
        match self {
            Self::Image => "Image is too large. Please try uploading a smaller image.",
            Self::Video => "Video is too large. Please try uploading a smaller video (max 50MB).",
            Self::File => "File is too large. Please upload a smaller file.",
        }
    }

    fn failed_message(self) -> &'static str {
        match self {
            Self::Image => "Image upload failed.",
            Self::Video => "Video upload failed.",
            Self::File => "File upload failed.",
        }
    }
}

/// A file staged for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Explicit MIME type; guessed from the file name when `None`.
    pub mime: Option<String>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Read a file from disk.
    pub async fn from_path(path: &Path) -> Result<Self, Error> {
        let bytes = tokio::fs::read(path).await.map_err(|e| Error::Upload {
            reason: UploadFailure::Rejected,
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_owned();
        Ok(Self::new(file_name, bytes))
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::detect(&self.file_name, self.mime.as_deref())
    }

    /// The MIME type sent with the multipart part.
    pub fn content_type(&self) -> String {
        self.mime.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_owned()
        })
    }

    /// Enforce the size limit and MIME allowlist for this file's kind.
    pub fn validate(&self) -> Result<MediaKind, Error> {
        let kind = self.kind();

        if self.bytes.len() > kind.max_bytes() {
            return Err(Error::Upload {
                reason: UploadFailure::TooLarge,
                message: kind.too_large_message().into(),
            });
        }

        if let Some(allowed) = kind.allowed_types() {
            let content_type = self.content_type();
            if !allowed.contains(&content_type.as_str()) {
                return Err(Error::Upload {
                    reason: UploadFailure::UnsupportedType,
                    message: format!("Unsupported {kind} type: {content_type}"),
                });
            }
        }

        Ok(kind)
    }
}

/// Anything that can host a file and hand back its public URL.
pub trait MediaUploader: Send + Sync {
    fn upload(&self, file: UploadFile) -> impl Future<Output = Result<String, Error>> + Send;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    #[serde(default)]
    file_url: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the storage host's `POST /storage/upload` endpoint.
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl UploadClient {
    /// `endpoint` is the full upload URL; `api_key` goes in `x-api-key`.
    pub fn new(endpoint: Url, api_key: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut value = HeaderValue::from_str(api_key)
            .map_err(|e| Error::validation("upload api key", &e.to_string()))?;
        value.set_sensitive(true);
        headers.insert("x-api-key", value);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl MediaUploader for UploadClient {
    async fn upload(&self, file: UploadFile) -> Result<String, Error> {
        let kind = file.validate()?;
        let content_type = file.content_type();
        debug!(
            file = %file.file_name,
            %kind,
            bytes = file.bytes.len(),
            "uploading media"
        );

        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&content_type)
            .map_err(|e| Error::Upload {
                reason: UploadFailure::UnsupportedType,
                message: format!("Unsupported {kind} type: {e}"),
            })?;
        let form = Form::new().part("file", part);

        let mut request = self.http.post(self.endpoint.clone()).multipart(form);
        if let Some(timeout) = kind.timeout() {
            request = request.timeout(timeout);
        }

        let resp = match request.send().await {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                warn!(%kind, "upload timed out");
                return Err(Error::Upload {
                    reason: UploadFailure::Timeout,
                    message: format!(
                        "{} upload timed out. Please check your internet connection and try again.",
                        capitalized(kind)
                    ),
                });
            }
            Err(e) => return Err(Error::transport(e, kind.failed_message())),
        };

        let status = resp.status();
        if status == reqwest::StatusCode::PAYLOAD_TOO_LARGE {
            return Err(Error::Upload {
                reason: UploadFailure::TooLarge,
                message: kind.too_large_message().into(),
            });
        }

        let text = resp
            .text()
            .await
            .map_err(|e| Error::transport(e, kind.failed_message()))?;

        if !status.is_success() {
            return Err(Error::Upload {
                reason: UploadFailure::Rejected,
                message: error_message(
                    Some(&text),
                    Some(&format!("Request failed with status code {}", status.as_u16())),
                    kind.failed_message(),
                ),
            });
        }

        let body: UploadResponse = serde_json::from_str(&text).unwrap_or(UploadResponse {
            file_url: None,
            message: None,
        });

        match body.file_url.filter(|u| !u.is_empty()) {
            Some(url) => Ok(url),
            None => Err(Error::Upload {
                reason: UploadFailure::Rejected,
                message: body
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| kind.failed_message().into()),
            }),
        }
    }
}

fn capitalized(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "Image",
        MediaKind::Video => "Video",
        MediaKind::File => "File",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn kind_detected_from_extension_and_mime() {
        assert_eq!(MediaKind::detect("banner.JPG", None), MediaKind::Image);
        assert_eq!(MediaKind::detect("promo.mov", None), MediaKind::Video);
        assert_eq!(MediaKind::detect("brochure.pdf", None), MediaKind::File);
        assert_eq!(MediaKind::detect("blob", Some("video/mp4")), MediaKind::Video);
    }

    #[test]
    fn oversize_image_rejected_before_sending() {
        let file = UploadFile::new("big.png", vec![0; 10 * MIB + 1]);
        let err = file.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Upload {
                reason: UploadFailure::TooLarge,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "Image is too large. Please try uploading a smaller image."
        );
    }

    #[test]
    fn video_allows_up_to_fifty_mib() {
        let file = UploadFile::new("clip.mp4", vec![0; 20 * MIB]);
        assert_eq!(file.validate().unwrap(), MediaKind::Video);
        assert_eq!(MediaKind::Video.timeout(), Some(Duration::from_secs(300)));
        assert_eq!(MediaKind::Image.timeout(), None);
    }

    #[test]
    fn image_outside_allowlist_rejected() {
        let file = UploadFile::new("logo.svg", vec![1, 2, 3]).with_mime("image/svg+xml");
        let err = file.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Upload {
                reason: UploadFailure::UnsupportedType,
                ..
            }
        ));
    }

    #[test]
    fn content_type_guessed_from_name() {
        assert_eq!(UploadFile::new("a.webp", vec![]).content_type(), "image/webp");
        assert_eq!(
            UploadFile::new("a.unknownext", vec![]).content_type(),
            "application/octet-stream"
        );
    }
}
