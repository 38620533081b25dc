// Typed records for the marketplace admin API.
//
// The backend is a MongoDB-style service: ids arrive as `_id`, most fields
// are optional, and a few numeric fields are sometimes sent as strings.
// Everything is parsed leniently here so callers only ever see typed data.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Pagination ──────────────────────────────────────────────────────

/// One page of a list endpoint, with the envelope's pagination counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
    pub current_page: Option<u64>,
    pub total_pages: Option<u64>,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ── Auth ────────────────────────────────────────────────────────────

/// The signed-in administrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(remote = "Self")]
pub struct AdminUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Login response: `{ token, data: { user } }`. Some deployments nest
/// the token under `data` as well.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub data: Option<LoginData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginData {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<AdminUser>,
}

// ── Dashboard ───────────────────────────────────────────────────────

/// Headline counters shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    #[serde(default)]
    pub pending_approvals: u64,
    #[serde(default)]
    pub total_engineers: u64,
    #[serde(default)]
    pub verified_shops: u64,
    #[serde(default)]
    pub active_ads: u64,
    /// Counters this client does not know about yet.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Free-form analytics payload; its shape varies by backend version.
pub type DashboardAnalytics = Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(remote = "Self")]
pub struct Activity {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, alias = "description")]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

// ── Ads ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(remote = "Self")]
pub struct Ad {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Older records store the URL under `image`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Ad {
    /// The image URL, whichever field the backend used. Empty when unset.
    pub fn image(&self) -> &str {
        self.image_url
            .as_deref()
            .or(self.image.as_deref())
            .unwrap_or_default()
    }
}

/// Fields for a new ad. `title` and `description` are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdDraft {
    pub title: String,
    pub description: String,
    /// Always sent, empty when the ad has no image.
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Partial ad update. Unset fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ── Engineers ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(remote = "Self")]
pub struct Engineer {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub whatsapp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub experience: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub services: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Fields for a new engineer. `name`, `email` and `phone` are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineerDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

// ── Shops ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(remote = "Self")]
pub struct Shop {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub services: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Fields for a new shop. `name`, `owner_name` and `email` are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopDraft {
    pub name: String,
    pub owner_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ── Products ────────────────────────────────────────────────────────

/// Moderation state of a marketplace listing.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    /// Any value this client does not recognise.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(remote = "Self")]
pub struct Product {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub governorate: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default)]
    pub contact_info: Option<Value>,
    #[serde(default, deserialize_with = "string_list")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ProductStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `PUT /products/update-product/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatusUpdate {
    pub status: ProductStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl ProductStatusUpdate {
    pub fn approve() -> Self {
        Self {
            status: ProductStatus::Approved,
            rejection_reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            status: ProductStatus::Rejected,
            rejection_reason: Some(reason.into()),
        }
    }
}

// ── Lenient field decoders ──────────────────────────────────────────

/// Accept a string, number or bool and keep it as text.
fn lenient_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Accept an array of strings or a single comma-separated string.
fn string_list<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(de)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect(),
        _ => Vec::new(),
    })
}

/// Required text fields: `null` and missing both decode as empty.
fn null_as_empty<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_string(de).map(Option::unwrap_or_default)
}

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(de).map(Option::unwrap_or_default)
}

// ── Record ids ──────────────────────────────────────────────────────

/// Fold `_id` and `id` into a single `id` string. `_id` wins when both
/// are present; `{ "$oid": ... }` and numeric ids are flattened to text.
fn canonical_id(mut value: Value) -> Value {
    if let Value::Object(map) = &mut value {
        let mongo = map.remove("_id").filter(|v| !v.is_null());
        let plain = map.remove("id").filter(|v| !v.is_null());
        let id = match mongo.or(plain) {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Object(mut oid)) => match oid.remove("$oid") {
                Some(Value::String(s)) => Some(s),
                _ => None,
            },
            _ => None,
        };
        if let Some(id) = id {
            map.insert("id".into(), Value::String(id));
        }
    }
    value
}

/// Wire the derived (`remote = "Self"`) impls of a record through
/// [`canonical_id`] so either id spelling, or both, decodes cleanly.
macro_rules! mongo_record {
    ($($ty:ident),+ $(,)?) => {$(
        impl Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                $ty::serialize(self, serializer)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = canonical_id(Value::deserialize(deserializer)?);
                $ty::deserialize(value).map_err(serde::de::Error::custom)
            }
        }
    )+};
}

mongo_record!(AdminUser, Activity, Ad, Engineer, Shop, Product);

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn engineer_accepts_mongo_id_and_numeric_phone() {
        let e: Engineer = serde_json::from_value(json!({
            "_id": "64f0",
            "name": "Ahmed",
            "email": "a@example.com",
            "phone": 201_234_567,
            "services": "Installation, Maintenance",
            "unknownField": true
        }))
        .unwrap();
        assert_eq!(e.id, "64f0");
        assert_eq!(e.phone.as_deref(), Some("201234567"));
        assert_eq!(e.services, vec!["Installation", "Maintenance"]);
    }

    #[test]
    fn ad_image_prefers_image_url() {
        let ad: Ad = serde_json::from_value(json!({
            "_id": "1", "title": "t", "description": "d",
            "image": "old.png", "imageUrl": "new.png"
        }))
        .unwrap();
        assert_eq!(ad.image(), "new.png");

        let bare: Ad = serde_json::from_value(json!({"_id": "2"})).unwrap();
        assert_eq!(bare.image(), "");
    }

    #[test]
    fn dashboard_counts_keep_unknown_counters() {
        let c: DashboardCounts = serde_json::from_value(json!({
            "pendingApprovals": 3,
            "totalEngineers": 12,
            "verifiedShops": 4,
            "activeAds": 2,
            "totalProducts": 40
        }))
        .unwrap();
        assert_eq!(c.pending_approvals, 3);
        assert_eq!(c.extra.get("totalProducts"), Some(&json!(40)));
    }

    #[test]
    fn rejection_body_carries_reason() {
        let body = serde_json::to_value(ProductStatusUpdate::reject("blurry photos")).unwrap();
        assert_eq!(
            body,
            json!({"status": "rejected", "rejectionReason": "blurry photos"})
        );
        let body = serde_json::to_value(ProductStatusUpdate::approve()).unwrap();
        assert_eq!(body, json!({"status": "approved"}));
    }

    #[test]
    fn unrecognised_or_null_product_status_still_decodes() {
        let products: Vec<Product> = serde_json::from_value(json!([
            {"_id": "p1", "name": "Panel", "status": "sold"},
            {"_id": "p2", "name": "Inverter", "status": null},
            {"_id": "p3", "name": "Battery", "status": "approved"}
        ]))
        .unwrap();
        assert_eq!(products[0].status, ProductStatus::Unknown);
        assert_eq!(products[1].status, ProductStatus::Pending);
        assert_eq!(products[2].status, ProductStatus::Approved);
    }

    #[test]
    fn mongo_id_wins_when_both_ids_are_sent() {
        let shop: Shop = serde_json::from_value(json!({
            "_id": "64f0", "id": "legacy-7", "name": "Sun Shop"
        }))
        .unwrap();
        assert_eq!(shop.id, "64f0");

        let oid: Shop = serde_json::from_value(json!({"_id": {"$oid": "65aa"}})).unwrap();
        assert_eq!(oid.id, "65aa");
    }

    #[test]
    fn plain_id_survives_a_serialize_round_trip() {
        let user = AdminUser {
            id: "admin-1".into(),
            name: Some("Admin".into()),
            ..AdminUser::default()
        };
        let text = serde_json::to_string(&user).unwrap();
        assert!(text.contains(r#""id":"admin-1""#));
        let back: AdminUser = serde_json::from_str(&text).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn null_required_strings_decode_as_empty() {
        let engineers: Vec<Engineer> = serde_json::from_value(json!([
            {"_id": "e1", "name": null, "email": "a@solar.eg"},
            {"_id": "e2", "name": "Mona", "email": null}
        ]))
        .unwrap();
        assert_eq!(engineers[0].name, "");
        assert_eq!(engineers[1].email, "");

        let ad: Ad = serde_json::from_value(json!({"_id": "a1", "title": null})).unwrap();
        assert!(ad.title.is_empty());
    }
}
