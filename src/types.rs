//! Core data model types shared by the pipeline and the scripting environment.
//!
//! The pipeline moves fixed-width [`Tuple`]s of [`Value`]s around, usually grouped into a
//! [`DataSet`] described by a [`Schema`]. Scripting-environment callables consume and produce the
//! same [`Value`] type, which is why it carries container and function variants as well.

use std::slice;

use crate::bridge::callable::Callable;

/// Logical data type for a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Any value, including containers.
    Any,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the shape of the tuples flowing through an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Number of fields, i.e. the arity every conforming tuple has.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` if the schema declares no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single dynamic value.
///
/// `Null` is the absence sentinel. `List` and `Set` are the containers recognised by
/// [`crate::bridge::to_tuple`]; a `Set` iterates in storage order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/absent value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Ordered container.
    List(Vec<Value>),
    /// Unordered container without duplicates.
    Set(Vec<Value>),
    /// A scripting-environment function.
    Fn(Callable),
}

impl Value {
    /// Build a `Set`, dropping duplicate elements but keeping first-seen order.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        let mut out: Vec<Value> = Vec::new();
        for item in items {
            if !out.contains(&item) {
                out.push(item);
            }
        }
        Value::Set(out)
    }

    /// Short variant name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int64(_) => "int64",
            Value::Float64(_) => "float64",
            Value::Bool(_) => "bool",
            Value::Utf8(_) => "utf8",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Fn(_) => "fn",
        }
    }

    /// Elements of a `List` or `Set`; `None` for scalars.
    pub fn as_container(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Set(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Convert a JSON literal. Objects (at any depth) and integers outside `i64` have no
    /// counterpart and yield `None`.
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        match json {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            // Integers beyond i64 have no exact counterpart and are rejected.
            serde_json::Value::Number(n) if n.is_f64() => n.as_f64().map(Value::Float64),
            serde_json::Value::Number(n) => n.as_i64().map(Value::Int64),
            serde_json::Value::String(s) => Some(Value::Utf8(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Value::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Value::List),
            serde_json::Value::Object(_) => None,
        }
    }

    /// Convert to JSON. Functions and non-finite floats yield `None`.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Value::Null => Some(serde_json::Value::Null),
            Value::Int64(v) => Some(serde_json::Value::from(*v)),
            Value::Float64(v) => serde_json::Number::from_f64(*v).map(serde_json::Value::Number),
            Value::Bool(b) => Some(serde_json::Value::Bool(*b)),
            Value::Utf8(s) => Some(serde_json::Value::String(s.clone())),
            Value::List(items) | Value::Set(items) => items
                .iter()
                .map(Value::to_json)
                .collect::<Option<Vec<_>>>()
                .map(serde_json::Value::Array),
            Value::Fn(_) => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl From<Callable> for Value {
    fn from(f: Callable) -> Self {
        Value::Fn(f)
    }
}

/// A fixed-order sequence of values.
///
/// Tuples are produced by the pipeline and only ever read by the bridge; coercion always builds a
/// new tuple.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tuple(Vec<Value>);

impl Tuple {
    /// Create a tuple from its elements.
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Number of elements.
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// Element at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Iterate the elements in order.
    pub fn iter(&self) -> slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// Borrow the elements as a slice.
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }
}

impl From<Vec<Value>> for Tuple {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for Tuple {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Tuple {
    type Item = &'a Value;
    type IntoIter = slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// In-memory table of tuples.
///
/// Every row is expected to have the arity declared by the [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row storage.
    pub rows: Vec<Tuple>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Tuple>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Create a new dataset containing only rows for which `predicate` returns `Ok(true)`.
    ///
    /// The returned dataset preserves the original schema. The first error aborts the scan.
    pub fn try_filter_rows<F, E>(&self, mut predicate: F) -> Result<Self, E>
    where
        F: FnMut(&Tuple) -> Result<bool, E>,
    {
        let mut rows = Vec::new();
        for row in &self.rows {
            if predicate(row)? {
                rows.push(row.clone());
            }
        }
        Ok(Self {
            schema: self.schema.clone(),
            rows,
        })
    }

    /// Create a new dataset with `schema` by expanding every row into zero or more output rows.
    ///
    /// The first error aborts the scan.
    pub fn try_flat_map_rows<F, E>(&self, schema: Schema, mut mapper: F) -> Result<Self, E>
    where
        F: FnMut(&Tuple) -> Result<Vec<Tuple>, E>,
    {
        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            rows.extend(mapper(row)?);
        }
        Ok(Self { schema, rows })
    }
}
