//! Tuple filtering through a resolved predicate.

use crate::bridge::{is_truthy, to_sequence, Callable};
use crate::error::BridgeResult;
use crate::types::{DataSet, Tuple};

/// Call `f` with the elements of `tuple` and report whether the result is truthy.
pub fn keep_tuple(f: &Callable, tuple: &Tuple) -> BridgeResult<bool> {
    let result = f.apply_to(to_sequence(tuple).cloned())?;
    Ok(is_truthy(&result))
}

/// Returns a new [`DataSet`] containing only rows for which `f` returns a truthy value.
///
/// Only `Null` and `Bool(false)` drop a row; `0`, `""` and empty containers keep it.
pub fn filter(dataset: &DataSet, f: &Callable) -> BridgeResult<DataSet> {
    dataset.try_filter_rows(|row| keep_tuple(f, row))
}
