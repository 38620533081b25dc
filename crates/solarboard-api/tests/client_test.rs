#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use solarboard_api::{
    AdminUser, ApiClient, EngineerDraft, Error, ErrorKind, MemorySessionStore, ProductStatus,
    ProductStatusUpdate, Session, SessionStore,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient, Arc<MemorySessionStore>) {
    let server = MockServer::start().await;
    let store = Arc::new(MemorySessionStore::new());
    let client = ApiClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        store.clone(),
    );
    (server, client, store)
}

fn logged_in(store: &MemorySessionStore, token: &str) {
    let user = AdminUser {
        id: "admin-1".into(),
        ..AdminUser::default()
    };
    store.save(&Session::new(token, user)).unwrap();
}

fn password(s: &str) -> SecretString {
    s.to_string().into()
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_persists_full_session() {
    let (server, client, store) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/admin-auth/login"))
        .and(body_json(json!({"email": "admin@solar.eg", "password": "s3cret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "token": "jwt-abc",
            "data": {
                "user": {
                    "_id": "admin-1",
                    "name": "Admin",
                    "email": "admin@solar.eg",
                    "permissions": ["ads", "shops"]
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = client
        .login("admin@solar.eg", &password("s3cret"))
        .await
        .unwrap();

    assert_eq!(session.user_id, "admin-1");
    let stored = store.load().unwrap();
    assert!(stored.logged_in);
    assert_eq!(stored.permissions, vec!["ads", "shops"]);
    assert_eq!(stored.authorization(), "Bearer jwt-abc");
}

#[tokio::test]
async fn test_wrong_password_persists_nothing() {
    let (server, client, store) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/admin-auth/login"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"status": false, "message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let err = client
        .login("admin@solar.eg", &password("nope"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(store.load().is_none());
}

#[tokio::test]
async fn test_login_requires_credentials_without_network() {
    let (server, client, _store) = setup().await;

    let err = client.login("", &password("x")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = client.login("a@b.c", &password("")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Bearer + 401 tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_prefix_not_doubled() {
    let (server, client, store) = setup().await;
    logged_in(&store, "Bearer already-prefixed");

    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard/simple-counts"))
        .and(header("authorization", "Bearer already-prefixed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": {"pendingApprovals": 4, "totalEngineers": 9, "verifiedShops": 2, "activeAds": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let counts = client.dashboard_counts().await.unwrap();
    assert_eq!(counts.pending_approvals, 4);
    assert_eq!(counts.active_ads, 1);
}

#[tokio::test]
async fn test_anonymous_request_has_no_authorization_header() {
    let (server, client, _store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/ads/get/allAds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true, "data": []})))
        .mount(&server)
        .await;

    client.list_ads().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let (server, client, store) = setup().await;
    logged_in(&store, "expired");

    Mock::given(method("GET"))
        .and(path("/api/v1/marketplace/getAllShops"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})),
        )
        .mount(&server)
        .await;

    let err = client.list_shops().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "jwt expired");
    assert!(store.load().is_none());
}

// ── Error normalization tests ───────────────────────────────────────

#[tokio::test]
async fn test_structured_message_beats_transport_text() {
    let (server, client, _store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/marketplace/getAllEngineer"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"message": "Database unavailable", "error": "E500"})),
        )
        .mount(&server)
        .await;

    let err = client.list_engineers().await.unwrap_err();
    assert_eq!(err.to_string(), "Database unavailable");
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.kind(), ErrorKind::Server);
}

#[tokio::test]
async fn test_status_text_used_when_body_has_nothing() {
    let (server, client, _store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/marketplace/getAllEngineer"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = client.list_engineers().await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed with status code 502");
}

#[tokio::test]
async fn test_not_found_detail() {
    let (server, client, _store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/marketplace/getOneShop/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Shop not found"))
        .mount(&server)
        .await;

    let err = client.get_shop("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Shop not found");
}

// ── Resource tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_list_products_with_pagination() {
    let (server, client, _store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/marketplace/browse-products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": [
                {"_id": "p1", "name": "Panel 550W", "price": 4200, "status": "pending"},
                {"_id": "p2", "name": "Inverter", "price": "9000", "status": "approved"}
            ],
            "total": 2, "currentPage": 1, "totalPages": 1
        })))
        .mount(&server)
        .await;

    let page = client.list_products().await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.total, Some(2));
    assert_eq!(page.items[0].price.as_deref(), Some("4200"));
    assert_eq!(page.items[1].status, ProductStatus::Approved);
}

#[tokio::test]
async fn test_one_odd_record_does_not_fail_the_list() {
    let (server, client, _store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/marketplace/browse-products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": [
                {"_id": "p1", "name": "Panel", "status": "sold"},
                {"_id": "p2", "name": null, "status": null}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/marketplace/getAllShops"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": [{"_id": "s1", "id": "s1", "name": "Sun Shop"}]
        })))
        .mount(&server)
        .await;

    let products = client.list_products().await.unwrap();
    assert_eq!(products.items[0].status, ProductStatus::Unknown);
    assert_eq!(products.items[1].status, ProductStatus::Pending);
    assert_eq!(products.items[1].name, "");

    let shops = client.list_shops().await.unwrap();
    assert_eq!(shops.items[0].id, "s1");
}

#[tokio::test]
async fn test_reject_product_sends_reason() {
    let (server, client, _store) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/products/update-product/p1"))
        .and(body_json(json!({"status": "rejected", "rejectionReason": "Stock photo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": {"_id": "p1", "name": "Panel", "status": "rejected", "rejectionReason": "Stock photo"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let product = client
        .update_product_status("p1", &ProductStatusUpdate::reject("Stock photo"))
        .await
        .unwrap();
    assert_eq!(product.status, ProductStatus::Rejected);
}

#[tokio::test]
async fn test_reject_without_reason_is_validation_error() {
    let (server, client, _store) = setup().await;

    let err = client
        .update_product_status("p1", &ProductStatusUpdate::reject("  "))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_engineer_validates_then_posts() {
    let (server, client, _store) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/engineers/add"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "status": true,
            "message": "Engineer added",
            "data": {"_id": "e9", "name": "Mona", "email": "m@x.eg", "phone": "0100"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let missing_phone = EngineerDraft {
        name: "Mona".into(),
        email: "m@x.eg".into(),
        ..EngineerDraft::default()
    };
    let err = client.add_engineer(&missing_phone).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid phone: is required");

    let draft = EngineerDraft {
        phone: "0100".into(),
        ..missing_phone
    };
    let created = client.add_engineer(&draft).await.unwrap();
    assert_eq!(created.id, "e9");
}

#[tokio::test]
async fn test_failure_envelope_on_200() {
    let (server, client, _store) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/shops/delete/s1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "fail", "error": "Shop has active orders"})),
        )
        .mount(&server)
        .await;

    let err = client.delete_shop("s1").await.unwrap_err();
    assert_eq!(err.to_string(), "Shop has active orders");
}
