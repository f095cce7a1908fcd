//! Tuple mapping through a resolved callable.

use crate::bridge::{to_sequence, to_tuple, Callable};
use crate::error::{BridgeError, BridgeResult};
use crate::types::{DataSet, Schema, Tuple};

/// Call `f` with the elements of `tuple` and coerce the result back into a tuple.
pub fn map_tuple(f: &Callable, tuple: &Tuple) -> BridgeResult<Tuple> {
    let result = f.apply_to(to_sequence(tuple).cloned())?;
    Ok(to_tuple(&result))
}

/// Returns a new [`DataSet`] with `output` as schema, holding `f` applied to every row.
///
/// Fails on the first call error, or with [`BridgeError::ArityMismatch`] if a result does not
/// have one value per output field.
pub fn map(dataset: &DataSet, f: &Callable, output: Schema) -> BridgeResult<DataSet> {
    let expected = output.len();
    dataset.try_flat_map_rows(output, |row| {
        let out = map_tuple(f, row)?;
        check_arity(expected, &out)?;
        Ok(vec![out])
    })
}

pub(crate) fn check_arity(expected: usize, tuple: &Tuple) -> BridgeResult<()> {
    if tuple.arity() != expected {
        return Err(BridgeError::ArityMismatch {
            expected,
            actual: tuple.arity(),
        });
    }
    Ok(())
}
