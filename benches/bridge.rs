use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};

use pipeline_fn_bridge::bridge::{
    apply_spec, to_sequence, to_tuple, Arity, Bridge, FunctionSpec, Module, ModuleRegistry,
};
use pipeline_fn_bridge::execution::{ExecutionEngine, ExecutionOptions};
use pipeline_fn_bridge::processing::FunctionOperation;
use pipeline_fn_bridge::types::{DataSet, DataType, Field, Schema, Tuple, Value};

fn registry() -> ModuleRegistry {
    ModuleRegistry::new().with_module(Module::new("bench.math").define_fn(
        "add",
        Arity::AtLeast(0),
        |args| {
            let mut total = 0i64;
            for a in args {
                if let Value::Int64(n) = a {
                    total += n;
                }
            }
            Ok(Value::Int64(total))
        },
    ))
}

fn dataset(n: usize) -> DataSet {
    let schema = Schema::new(vec![
        Field::new("a", DataType::Int64),
        Field::new("b", DataType::Int64),
    ]);
    let rows = (0..n as i64)
        .map(|i| Tuple::new(vec![Value::Int64(i), Value::Int64(i * 2)]))
        .collect();
    DataSet::new(schema, rows)
}

fn bench_resolution(c: &mut Criterion) {
    let reg = registry();
    let spec = FunctionSpec::new("bench.math", "add").with_args([Value::Int64(5)]);
    c.bench_function("apply_spec_partial", |b| {
        b.iter(|| apply_spec(&reg, black_box(&spec)).unwrap())
    });
}

fn bench_invoke(c: &mut Criterion) {
    let reg = registry();
    let f = apply_spec(&reg, &FunctionSpec::new("bench.math", "add").with_args([Value::Int64(5)])).unwrap();
    let t = Tuple::new(vec![Value::Int64(1), Value::Int64(2), Value::Int64(3)]);
    c.bench_function("invoke_and_coerce", |b| {
        b.iter(|| {
            let out = f.apply_to(to_sequence(black_box(&t)).cloned()).unwrap();
            to_tuple(&out)
        })
    });
}

fn bench_engine(c: &mut Criterion) {
    let engine = ExecutionEngine::new(
        Bridge::new(Arc::new(registry())),
        ExecutionOptions::default(),
    );
    let ds = dataset(100_000);
    let op = FunctionOperation::map(FunctionSpec::new("bench.math", "add"))
        .with_output(Schema::new(vec![Field::new("sum", DataType::Int64)]));
    c.bench_function("engine_map_100k", |b| {
        b.iter(|| engine.run(black_box(&ds), &op).unwrap())
    });
}

criterion_group!(benches, bench_resolution, bench_invoke, bench_engine);
criterion_main!(benches);
