// Client-side field checks, run before any request is sent.

use crate::error::Error;

/// Fail with a validation error when `value` is empty or whitespace.
pub(crate) fn require(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    Ok(())
}

/// For partial updates: an absent field is fine, a blank one is not.
pub(crate) fn reject_blank(field: &str, value: Option<&str>) -> Result<(), Error> {
    value.map_or(Ok(()), |v| require(field, v))
}
