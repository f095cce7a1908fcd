//! Pipeline operations backed by a [`FunctionSpec`].
//!
//! A [`FunctionOperation`] is the configuration-time description; [`FunctionOperation::prepare`]
//! resolves it once into a [`PreparedOperation`] that is then applied tuple by tuple.

use crate::bridge::{Bridge, Callable, FunctionSpec};
use crate::error::BridgeResult;
use crate::types::{DataSet, Schema, Tuple};

use super::filter::keep_tuple;
use super::map::{check_arity, map_tuple};
use super::mapcat::mapcat_tuple;

/// What an operation does with each call result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// One output tuple per input tuple.
    Map,
    /// Zero or more output tuples per input tuple.
    Mapcat,
    /// Keep the input tuple when the result is truthy.
    Filter,
}

/// How the spec's literal arguments are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyMode {
    /// Prepend them to every call (see [`crate::bridge::apply_spec`]).
    #[default]
    Partial,
    /// Call the function with them once to build the real function
    /// (see [`crate::bridge::apply_factory_spec`]).
    Factory,
}

/// A pipeline operation described by a function spec.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionOperation {
    pub spec: FunctionSpec,
    pub kind: OperationKind,
    pub mode: ApplyMode,
    /// Declared output fields for `Map`/`Mapcat`. `None` means "same as the input".
    pub output: Option<Schema>,
}

impl FunctionOperation {
    pub fn new(kind: OperationKind, spec: FunctionSpec) -> Self {
        Self {
            spec,
            kind,
            mode: ApplyMode::default(),
            output: None,
        }
    }

    pub fn map(spec: FunctionSpec) -> Self {
        Self::new(OperationKind::Map, spec)
    }

    pub fn mapcat(spec: FunctionSpec) -> Self {
        Self::new(OperationKind::Mapcat, spec)
    }

    pub fn filter(spec: FunctionSpec) -> Self {
        Self::new(OperationKind::Filter, spec)
    }

    pub fn with_mode(mut self, mode: ApplyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_output(mut self, output: Schema) -> Self {
        self.output = Some(output);
        self
    }

    /// Schema of the tuples this operation emits for `input`.
    pub fn output_schema(&self, input: &Schema) -> Schema {
        match (self.kind, &self.output) {
            (OperationKind::Filter, _) | (_, None) => input.clone(),
            (_, Some(out)) => out.clone(),
        }
    }

    /// Resolve the spec through `bridge`.
    pub fn prepare(&self, bridge: &Bridge) -> BridgeResult<PreparedOperation> {
        let callable = match self.mode {
            ApplyMode::Partial => bridge.apply_spec(&self.spec)?,
            ApplyMode::Factory => bridge.apply_factory_spec(&self.spec)?,
        };
        Ok(PreparedOperation {
            kind: self.kind,
            callable,
        })
    }
}

/// An operation whose function has been resolved.
#[derive(Debug, Clone)]
pub struct PreparedOperation {
    kind: OperationKind,
    callable: Callable,
}

impl PreparedOperation {
    pub fn new(kind: OperationKind, callable: Callable) -> Self {
        Self { kind, callable }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn callable(&self) -> &Callable {
        &self.callable
    }

    /// Apply the operation to one tuple.
    pub fn operate(&self, tuple: &Tuple) -> BridgeResult<Vec<Tuple>> {
        match self.kind {
            OperationKind::Map => Ok(vec![map_tuple(&self.callable, tuple)?]),
            OperationKind::Mapcat => mapcat_tuple(&self.callable, tuple),
            OperationKind::Filter => Ok(if keep_tuple(&self.callable, tuple)? {
                vec![tuple.clone()]
            } else {
                Vec::new()
            }),
        }
    }

    /// [`Self::operate`], also checking every emitted tuple has `output.len()` fields.
    pub fn operate_checked(&self, tuple: &Tuple, output: &Schema) -> BridgeResult<Vec<Tuple>> {
        let out = self.operate(tuple)?;
        for t in &out {
            check_arity(output.len(), t)?;
        }
        Ok(out)
    }

    /// Apply the operation to every row of `dataset`, sequentially.
    pub fn run(&self, dataset: &DataSet, output: Schema) -> BridgeResult<DataSet> {
        let expected = output.clone();
        dataset.try_flat_map_rows(output, |row| self.operate_checked(row, &expected))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{ApplyMode, FunctionOperation, OperationKind};
    use crate::bridge::{Arity, Bridge, Callable, FunctionSpec, Module, ModuleRegistry};
    use crate::error::BridgeError;
    use crate::types::{DataSet, DataType, Field, Schema, Tuple, Value};

    fn bridge() -> Bridge {
        let registry = ModuleRegistry::new().with_module(
            Module::new("ops.core")
                .define_fn("mul", Arity::Exact(2), |args| match (&args[0], &args[1]) {
                    (Value::Int64(a), Value::Int64(b)) => Ok(Value::Int64(a * b)),
                    _ => Ok(Value::Null),
                })
                .define_fn("above", Arity::Exact(2), |args| match (&args[0], &args[1]) {
                    (Value::Int64(limit), Value::Int64(x)) => Ok(Value::Bool(x > limit)),
                    _ => Ok(Value::Null),
                })
                .define_fn("repeat", Arity::Exact(2), |args| match &args[0] {
                    Value::Int64(n) => Ok(Value::List(vec![args[1].clone(); *n as usize])),
                    _ => Ok(Value::Null),
                })
                .define_fn("times", Arity::Exact(1), |args| {
                    let k = match &args[0] {
                        Value::Int64(k) => *k,
                        _ => 1,
                    };
                    Ok(Value::Fn(Callable::native("times*", Arity::Exact(1), move |xs| {
                        match &xs[0] {
                            Value::Int64(x) => Ok(Value::Int64(k * x)),
                            other => Ok(other.clone()),
                        }
                    })))
                }),
        );
        Bridge::new(Arc::new(registry))
    }

    fn numbers() -> DataSet {
        DataSet::new(
            Schema::new(vec![Field::new("n", DataType::Int64)]),
            (1..=4).map(|i| Tuple::new(vec![Value::Int64(i)])).collect(),
        )
    }

    fn ints(values: &[i64]) -> Vec<Tuple> {
        values
            .iter()
            .map(|v| Tuple::new(vec![Value::Int64(*v)]))
            .collect()
    }

    #[test]
    fn map_operation_partially_applies_the_spec() {
        let op = FunctionOperation::map(FunctionSpec::new("ops.core", "mul").with_args([Value::Int64(3)]));
        let prepared = op.prepare(&bridge()).unwrap();
        assert_eq!(prepared.kind(), OperationKind::Map);

        let ds = numbers();
        let out = prepared.run(&ds, op.output_schema(&ds.schema)).unwrap();
        assert_eq!(out.rows, ints(&[3, 6, 9, 12]));
    }

    #[test]
    fn filter_operation_keeps_truthy_rows() {
        let op = FunctionOperation::filter(FunctionSpec::new("ops.core", "above").with_args([Value::Int64(2)]));
        let prepared = op.prepare(&bridge()).unwrap();
        let ds = numbers();
        let out = prepared.run(&ds, op.output_schema(&ds.schema)).unwrap();
        assert_eq!(out.rows, ints(&[3, 4]));
    }

    #[test]
    fn mapcat_operation_expands_rows() {
        let op = FunctionOperation::mapcat(FunctionSpec::new("ops.core", "repeat").with_args([Value::Int64(2)]))
            .with_output(Schema::new(vec![Field::new("n", DataType::Int64)]));
        let prepared = op.prepare(&bridge()).unwrap();
        let ds = numbers();
        let out = prepared.run(&ds, op.output_schema(&ds.schema)).unwrap();
        assert_eq!(out.rows, ints(&[1, 1, 2, 2, 3, 3, 4, 4]));
    }

    #[test]
    fn factory_mode_builds_the_function_from_the_literals() {
        let op = FunctionOperation::map(FunctionSpec::new("ops.core", "times").with_args([Value::Int64(10)]))
            .with_mode(ApplyMode::Factory);
        let prepared = op.prepare(&bridge()).unwrap();
        assert_eq!(prepared.operate(&ints(&[4])[0]).unwrap(), ints(&[40]));
    }

    #[test]
    fn output_schema_mismatch_is_reported() {
        let op = FunctionOperation::map(FunctionSpec::new("ops.core", "mul").with_args([Value::Int64(3)]))
            .with_output(Schema::new(vec![
                Field::new("a", DataType::Int64),
                Field::new("b", DataType::Int64),
            ]));
        let prepared = op.prepare(&bridge()).unwrap();
        let ds = numbers();
        let err = prepared.run(&ds, op.output_schema(&ds.schema)).unwrap_err();
        assert!(matches!(err, BridgeError::ArityMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn filter_ignores_declared_output() {
        let op = FunctionOperation::filter(FunctionSpec::new("ops.core", "above"))
            .with_output(Schema::new(Vec::new()));
        let input = Schema::new(vec![Field::new("n", DataType::Int64)]);
        assert_eq!(op.output_schema(&input), input);
    }

    #[test]
    fn prepare_surfaces_resolution_errors() {
        let op = FunctionOperation::map(FunctionSpec::new("ops.missing", "f"));
        assert!(matches!(op.prepare(&bridge()), Err(BridgeError::Resolution(_))));
    }
}
