//! Raw string coercion for patch values.

use crate::error::{ModelError, ModelResult};

/// Parse a base-10 signed integer.
pub fn parse_integer(field: &str, raw: &str) -> ModelResult<i64> {
    raw.parse::<i64>()
        .map_err(|e| ModelError::mismatch(field, format!("{raw:?} is not an integer ({e})")))
}

/// Parse `true` or `false`, ignoring ASCII case.
pub fn parse_boolean(field: &str, raw: &str) -> ModelResult<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ModelError::mismatch(field, format!("{raw:?} is not a boolean")))
    }
}
