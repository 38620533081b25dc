#![allow(clippy::unwrap_used)]
// Integration tests for `UploadClient` and image-first ad writes.

use std::sync::Arc;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use solarboard_api::{
    AdDraft, AdPatch, ApiClient, Error, MediaUploader, MemorySessionStore, TransportConfig,
    UploadClient, UploadFailure, UploadFile,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient, UploadClient) {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();
    let api = ApiClient::with_client(
        reqwest::Client::new(),
        base.clone(),
        Arc::new(MemorySessionStore::new()),
    );
    let uploader = UploadClient::new(
        base.join("/storage/upload").unwrap(),
        "test-key",
        &TransportConfig::default(),
    )
    .unwrap();
    (server, api, uploader)
}

fn png() -> UploadFile {
    UploadFile::new("banner.png", vec![0x89, b'P', b'N', b'G'])
}

// ── Upload tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_sends_api_key_and_returns_url() {
    let (server, _api, uploader) = setup().await;

    Mock::given(method("POST"))
        .and(path("/storage/upload"))
        .and(header("x-api-key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"fileUrl": "https://cdn.example/banner.png"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = uploader.upload(png()).await.unwrap();
    assert_eq!(url, "https://cdn.example/banner.png");

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"banner.png\""));
}

#[tokio::test]
async fn test_upload_413_maps_to_size_message() {
    let (server, _api, uploader) = setup().await;

    Mock::given(method("POST"))
        .and(path("/storage/upload"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&server)
        .await;

    let err = uploader.upload(png()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Image is too large. Please try uploading a smaller image."
    );
}

#[tokio::test]
async fn test_upload_without_file_url_uses_message() {
    let (server, _api, uploader) = setup().await;

    Mock::given(method("POST"))
        .and(path("/storage/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Quota exceeded"})))
        .mount(&server)
        .await;

    let err = uploader.upload(png()).await.unwrap_err();
    assert_eq!(err.to_string(), "Quota exceeded");
}

#[tokio::test]
async fn test_oversize_file_never_sent() {
    let (server, _api, uploader) = setup().await;

    let file = UploadFile::new("huge.jpg", vec![0; 11 * 1024 * 1024]);
    let err = uploader.upload(file).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Upload {
            reason: UploadFailure::TooLarge,
            ..
        }
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Ad + image composition tests ────────────────────────────────────

#[tokio::test]
async fn test_update_ad_with_image_uploads_first() {
    let (server, api, uploader) = setup().await;

    Mock::given(method("POST"))
        .and(path("/storage/upload"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"fileUrl": "https://cdn/new.png"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/ads/update/ad1"))
        .and(body_json(json!({"title": "Winter sale", "imageUrl": "https://cdn/new.png"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": {"_id": "ad1", "title": "Winter sale", "imageUrl": "https://cdn/new.png"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let patch = AdPatch {
        title: Some("Winter sale".into()),
        ..AdPatch::default()
    };
    let ad = api
        .update_ad_with_image(&uploader, "ad1", patch, Some(png()))
        .await
        .unwrap();
    assert_eq!(ad.image(), "https://cdn/new.png");
}

#[tokio::test]
async fn test_failed_upload_aborts_ad_update() {
    let (server, api, uploader) = setup().await;

    Mock::given(method("POST"))
        .and(path("/storage/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "disk full"})))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/ads/update/ad1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true})))
        .expect(0)
        .mount(&server)
        .await;

    let err = api
        .update_ad_with_image(&uploader, "ad1", AdPatch::default(), Some(png()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "disk full");
}

#[tokio::test]
async fn test_create_ad_without_image_sends_empty_url() {
    let (server, api, uploader) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/ads/postads"))
        .and(body_json(json!({"title": "Solar promo", "description": "10% off", "imageUrl": ""})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "status": true,
            "data": {"_id": "ad2", "title": "Solar promo", "description": "10% off", "imageUrl": ""}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let draft = AdDraft {
        title: "Solar promo".into(),
        description: "10% off".into(),
        ..AdDraft::default()
    };
    let ad = api.create_ad_with_image(&uploader, draft, None).await.unwrap();
    assert_eq!(ad.id, "ad2");
    assert_eq!(ad.image(), "");
}
