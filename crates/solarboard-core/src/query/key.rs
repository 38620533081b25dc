// ── Query keys ──
//
// Hierarchical, structurally compared cache keys. A key is an ordered list
// of segments starting with a resource namespace; keys that share a prefix
// form a family, which is the unit of invalidation.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// List filters. Ordered, so equal filter sets always build equal keys.
pub type Filters = BTreeMap<String, String>;

/// One segment of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum KeySegment {
    Name(String),
    Filters(Filters),
}

impl From<&str> for KeySegment {
    fn from(s: &str) -> Self {
        Self::Name(s.to_owned())
    }
}

impl From<String> for KeySegment {
    fn from(s: String) -> Self {
        Self::Name(s)
    }
}

impl From<Filters> for KeySegment {
    fn from(f: Filters) -> Self {
        Self::Filters(f)
    }
}

impl fmt::Display for KeySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Filters(filters) => {
                f.write_str("{")?;
                for (i, (k, v)) in filters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// A cache key such as `["shops", "detail", "64f0"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    pub fn new(namespace: &str) -> Self {
        Self(vec![KeySegment::from(namespace)])
    }

    /// Extend this key by one segment.
    #[must_use]
    pub fn with(mut self, segment: impl Into<KeySegment>) -> Self {
        self.0.push(segment.into());
        self
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    pub fn namespace(&self) -> &str {
        match self.0.first() {
            Some(KeySegment::Name(ns)) => ns,
            _ => "",
        }
    }

    /// `true` if `prefix` names this key or one of its ancestors.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

// ── Key factories ───────────────────────────────────────────────────

/// Key factory for a CRUD resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceKeys {
    namespace: &'static str,
}

impl ResourceKeys {
    pub const fn new(namespace: &'static str) -> Self {
        Self { namespace }
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// `[ns]`
    pub fn all(&self) -> QueryKey {
        QueryKey::new(self.namespace)
    }

    /// `[ns, "list"]`
    pub fn lists(&self) -> QueryKey {
        self.all().with("list")
    }

    /// `[ns, "list", {filters}]`
    pub fn list(&self, filters: &Filters) -> QueryKey {
        self.lists().with(filters.clone())
    }

    /// `[ns, "detail"]`
    pub fn details(&self) -> QueryKey {
        self.all().with("detail")
    }

    /// `[ns, "detail", id]`
    pub fn detail(&self, id: &str) -> QueryKey {
        self.details().with(id)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DashboardKeys;

impl DashboardKeys {
    pub fn all(&self) -> QueryKey {
        QueryKey::new("dashboard")
    }

    pub fn counts(&self) -> QueryKey {
        self.all().with("counts")
    }

    pub fn analytics(&self) -> QueryKey {
        self.all().with("analytics")
    }

    pub fn activities(&self) -> QueryKey {
        self.all().with("activities")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AuthKeys;

impl AuthKeys {
    pub fn all(&self) -> QueryKey {
        QueryKey::new("auth")
    }

    pub fn user(&self) -> QueryKey {
        self.all().with("user")
    }
}

/// Well-known key factories, one per backend resource.
pub mod keys {
    use super::{AuthKeys, DashboardKeys, ResourceKeys};

    pub const ADS: ResourceKeys = ResourceKeys::new("ads");
    pub const SHOPS: ResourceKeys = ResourceKeys::new("shops");
    pub const ENGINEERS: ResourceKeys = ResourceKeys::new("engineer");
    pub const PRODUCTS: ResourceKeys = ResourceKeys::new("products");
    pub const DASHBOARD: DashboardKeys = DashboardKeys;
    pub const AUTH: AuthKeys = AuthKeys;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn filters(pairs: &[(&str, &str)]) -> Filters {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn equal_filters_build_equal_keys() {
        let a = keys::PRODUCTS.list(&filters(&[("status", "pending"), ("city", "Cairo")]));
        let b = keys::PRODUCTS.list(&filters(&[("city", "Cairo"), ("status", "pending")]));
        assert_eq!(a, b);
    }

    #[test]
    fn family_membership() {
        let detail = keys::SHOPS.detail("s1");
        assert!(detail.starts_with(&keys::SHOPS.all()));
        assert!(detail.starts_with(&keys::SHOPS.details()));
        assert!(!detail.starts_with(&keys::SHOPS.lists()));
        assert!(!detail.starts_with(&keys::ADS.all()));
        assert!(keys::ADS.list(&Filters::new()).starts_with(&keys::ADS.lists()));
    }

    #[test]
    fn engineer_namespace_is_singular() {
        assert_eq!(keys::ENGINEERS.all().namespace(), "engineer");
    }

    #[test]
    fn display_is_path_like() {
        insta::assert_snapshot!(
            keys::PRODUCTS.list(&filters(&[("status", "pending"), ("city", "Giza")])),
            @"products/list/{city=Giza,status=pending}"
        );
        insta::assert_snapshot!(keys::DASHBOARD.counts(), @"dashboard/counts");
        insta::assert_snapshot!(keys::ENGINEERS.list(&Filters::new()), @"engineer/list/{}");
    }

    #[test]
    fn serializes_as_tuple() {
        let key = keys::ADS.detail("a1");
        assert_eq!(
            serde_json::to_value(&key).unwrap(),
            serde_json::json!(["ads", "detail", "a1"])
        );
    }
}
