//! One-to-many tuple mapping through a resolved callable.

use crate::bridge::{to_sequence, to_tuple, Callable};
use crate::error::BridgeResult;
use crate::types::{DataSet, Schema, Tuple};

use super::map::check_arity;

/// Call `f` with the elements of `tuple` and turn each element of the result into a tuple.
///
/// A container result yields one tuple per element (none for an empty container); any other
/// result yields a single tuple.
pub fn mapcat_tuple(f: &Callable, tuple: &Tuple) -> BridgeResult<Vec<Tuple>> {
    let result = f.apply_to(to_sequence(tuple).cloned())?;
    Ok(match result.as_container() {
        Some(items) => items.iter().map(to_tuple).collect(),
        None => vec![to_tuple(&result)],
    })
}

/// Returns a new [`DataSet`] with `output` as schema, expanding every row through `f`.
pub fn mapcat(dataset: &DataSet, f: &Callable, output: Schema) -> BridgeResult<DataSet> {
    let expected = output.len();
    dataset.try_flat_map_rows(output, |row| {
        let out = mapcat_tuple(f, row)?;
        for t in &out {
            check_arity(expected, t)?;
        }
        Ok(out)
    })
}

#[cfg(test)]
mod tests {
    use super::{mapcat, mapcat_tuple};
    use crate::bridge::{Arity, Callable};
    use crate::types::{DataSet, DataType, Field, Schema, Tuple, Value};

    fn split_words() -> Callable {
        Callable::native("split-words", Arity::Exact(1), |args| match &args[0] {
            Value::Utf8(s) => Ok(Value::List(
                s.split_whitespace().map(Value::from).collect(),
            )),
            other => Ok(other.clone()),
        })
    }

    #[test]
    fn each_element_of_the_result_becomes_a_row() {
        let schema = Schema::new(vec![Field::new("line", DataType::Utf8)]);
        let ds = DataSet::new(
            schema.clone(),
            vec![
                Tuple::new(vec![Value::from("the quick fox")]),
                Tuple::new(vec![Value::from("")]),
                Tuple::new(vec![Value::from("jumps")]),
            ],
        );
        let out = mapcat(
            &ds,
            &split_words(),
            Schema::new(vec![Field::new("word", DataType::Utf8)]),
        )
        .unwrap();
        let words: Vec<Tuple> = ["the", "quick", "fox", "jumps"]
            .into_iter()
            .map(|w| Tuple::new(vec![Value::from(w)]))
            .collect();
        assert_eq!(out.rows, words);
    }

    #[test]
    fn nested_lists_become_multi_field_rows_and_scalars_one_row() {
        let pairs = Callable::native("pairs", Arity::AtLeast(0), |args| {
            Ok(Value::List(
                args.iter()
                    .map(|a| Value::List(vec![a.clone(), a.clone()]))
                    .collect(),
            ))
        });
        let out = mapcat_tuple(&pairs, &Tuple::new(vec![Value::Int64(1), Value::Int64(2)])).unwrap();
        assert_eq!(
            out,
            vec![
                Tuple::new(vec![Value::Int64(1), Value::Int64(1)]),
                Tuple::new(vec![Value::Int64(2), Value::Int64(2)]),
            ]
        );

        let out = mapcat_tuple(&split_words(), &Tuple::new(vec![Value::Int64(7)])).unwrap();
        assert_eq!(out, vec![Tuple::new(vec![Value::Int64(7)])]);
    }
}
