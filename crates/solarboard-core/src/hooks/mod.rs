// ── Resource queries and mutations ──
//
// One module per backend resource, each adding inherent methods to
// `Console`. Reads go through the query cache under the resource's key
// family; writes invalidate that family once they succeed and never touch
// another resource's keys.

mod ads;
mod auth;
mod dashboard;
mod engineers;
mod products;
mod shops;

use crate::config::QueryTiming;

/// Detail lookups are disabled until they have a non-blank id.
pub(crate) fn detail_id(id: Option<&str>) -> &str {
    id.map(str::trim).unwrap_or_default()
}

pub(crate) fn detail_timing(base: QueryTiming, id: &str) -> QueryTiming {
    QueryTiming {
        enabled: base.enabled && !id.is_empty(),
        ..base
    }
}

/// A disabled detail read is an empty result, not a failure.
pub(crate) fn optional<T>(
    result: Result<T, crate::error::CoreError>,
) -> Result<Option<T>, crate::error::CoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_disabled() => Ok(None),
        Err(e) => Err(e),
    }
}
