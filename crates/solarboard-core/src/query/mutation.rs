// ── Mutation descriptors ──
//
// A mutation names the key families it makes stale. The console applies
// the invalidation only after the write succeeded.

use super::key::{QueryKey, ResourceKeys};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationDescriptor {
    pub name: &'static str,
    pub invalidates: Vec<QueryKey>,
}

impl MutationDescriptor {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            invalidates: Vec::new(),
        }
    }

    #[must_use]
    pub fn invalidate(mut self, prefix: QueryKey) -> Self {
        self.invalidates.push(prefix);
        self
    }

    /// A create: only the resource's lists can have changed.
    pub fn created(name: &'static str, resource: ResourceKeys) -> Self {
        Self::new(name).invalidate(resource.lists())
    }

    /// An update or delete of one record: its lists and its detail entry.
    pub fn touched(name: &'static str, resource: ResourceKeys, id: &str) -> Self {
        Self::new(name)
            .invalidate(resource.lists())
            .invalidate(resource.detail(id))
    }
}
