//! Pipeline operations that call resolved functions.
//!
//! The processing layer operates on [`crate::types::DataSet`] values and a resolved
//! [`crate::bridge::Callable`]. Every row is handed to the callable as an argument sequence and
//! the result is coerced back into tuples.
//!
//! Currently implemented:
//!
//! - [`map()`]: one output row per input row
//! - [`mapcat()`]: zero or more output rows per input row
//! - [`filter()`]: keep rows whose result is truthy (only `Null`/`false` drop a row)
//! - [`FunctionOperation`]: spec-driven operation that resolves once and then runs per tuple
//!
//! ## Example: filter → map
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pipeline_fn_bridge::bridge::{Arity, Bridge, FunctionSpec, Module, ModuleRegistry};
//! use pipeline_fn_bridge::processing::{filter, map};
//! use pipeline_fn_bridge::types::{DataSet, DataType, Field, Schema, Tuple, Value};
//!
//! let registry = ModuleRegistry::new().with_module(
//!     Module::new("demo")
//!         .define_fn("positive?", Arity::Exact(1), |a| Ok(Value::Bool(matches!(a[0], Value::Int64(n) if n > 0))))
//!         .define_fn("scale", Arity::Exact(2), |a| match (&a[0], &a[1]) {
//!             (Value::Int64(k), Value::Int64(n)) => Ok(Value::Int64(k * n)),
//!             _ => Ok(Value::Null),
//!         }),
//! );
//! let bridge = Bridge::new(Arc::new(registry));
//!
//! let schema = Schema::new(vec![Field::new("n", DataType::Int64)]);
//! let ds = DataSet::new(
//!     schema.clone(),
//!     vec![
//!         Tuple::new(vec![Value::Int64(-1)]),
//!         Tuple::new(vec![Value::Int64(2)]),
//!     ],
//! );
//!
//! let positive = bridge.apply_spec(&FunctionSpec::new("demo", "positive?")).unwrap();
//! let triple = bridge
//!     .apply_spec(&FunctionSpec::new("demo", "scale").with_args([Value::Int64(3)]))
//!     .unwrap();
//!
//! let kept = filter(&ds, &positive).unwrap();
//! let out = map(&kept, &triple, schema).unwrap();
//! assert_eq!(out.rows, vec![Tuple::new(vec![Value::Int64(6)])]);
//! ```

pub mod filter;
pub mod map;
pub mod mapcat;
pub mod operation;

pub use filter::{filter, keep_tuple};
pub use map::{map, map_tuple};
pub use mapcat::{mapcat, mapcat_tuple};
pub use operation::{ApplyMode, FunctionOperation, OperationKind, PreparedOperation};
