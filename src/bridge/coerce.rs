//! Conversions between pipeline tuples and scripting-environment values.

use std::iter::FusedIterator;
use std::slice;

use crate::types::{Tuple, Value};

/// Single-pass, in-order view over a tuple's elements.
///
/// Deliberately not `Clone`: once consumed it cannot be restarted.
#[derive(Debug)]
pub struct Sequence<'a> {
    inner: slice::Iter<'a, Value>,
}

impl<'a> Iterator for Sequence<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Sequence<'_> {}

impl FusedIterator for Sequence<'_> {}

/// Lazy view over `tuple` yielding each element once, in tuple order.
pub fn to_sequence(tuple: &Tuple) -> Sequence<'_> {
    Sequence { inner: tuple.iter() }
}

/// Build a new tuple from `value`.
///
/// A `List` or `Set` contributes its elements in iteration order (an empty container gives an
/// empty tuple); any other value becomes a one-element tuple. Elements are copied, never
/// converted.
pub fn to_tuple(value: &Value) -> Tuple {
    match value.as_container() {
        Some(items) => Tuple::new(items.to_vec()),
        None => Tuple::new(vec![value.clone()]),
    }
}

/// Owning form of [`to_tuple`].
pub fn into_tuple(value: Value) -> Tuple {
    match value {
        Value::List(items) | Value::Set(items) => Tuple::new(items),
        scalar => Tuple::new(vec![scalar]),
    }
}
