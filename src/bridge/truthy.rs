//! Nil/false truthiness for filter-style operations.

use crate::types::Value;

/// Scripting-environment truthiness: only `Null` and `Bool(false)` are false.
///
/// Zero, empty strings and empty containers are all true.
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}
