//! `pipeline-fn-bridge` lets a tuple-oriented data pipeline call functions that live in a
//! separately loaded scripting environment, addressed by `(namespace, name)` pairs supplied as
//! data.
//!
//! The bridge itself is four stateless pieces (see [`bridge`]):
//!
//! - **Resolver** ([`bridge::resolve_callable`]): maps a namespace to a module path (`-` → `_`,
//!   `.` → `/`), asks a [`bridge::ModuleLoader`] to load it, and fetches the named callable.
//! - **Applier** ([`bridge::apply_spec`]): resolves a [`bridge::FunctionSpec`]
//!   (`[namespace, name, literal args..]`) and partially applies the literals.
//! - **Coercer** ([`bridge::to_sequence`], [`bridge::to_tuple`]): tuples become single-pass
//!   argument sequences; results become tuples (containers unwrap, scalars wrap).
//! - **Truthiness** ([`bridge::is_truthy`]): only `Null` and `false` are false.
//!
//! ## End-to-end example
//!
//! ```rust
//! use pipeline_fn_bridge::bridge::{apply_spec, to_sequence, to_tuple, Arity, FunctionSpec, Module, ModuleRegistry};
//! use pipeline_fn_bridge::types::{Tuple, Value};
//!
//! let registry = ModuleRegistry::new().with_module(Module::new("math-utils").define_fn(
//!     "add",
//!     Arity::AtLeast(0),
//!     |args| {
//!         let mut total = 0i64;
//!         for a in args {
//!             if let Value::Int64(n) = a {
//!                 total += n;
//!             }
//!         }
//!         Ok(Value::Int64(total))
//!     },
//! ));
//!
//! // Loads module path `math_utils`, binds 5 as the first argument.
//! let spec = FunctionSpec::from_json_str(r#"["math-utils", "add", 5]"#).unwrap();
//! let add5 = apply_spec(&registry, &spec).unwrap();
//!
//! let result = add5.apply_to(to_sequence(&Tuple::new(vec![Value::Int64(3)])).cloned()).unwrap();
//! assert_eq!(to_tuple(&result), Tuple::new(vec![Value::Int64(8)]));
//! ```
//!
//! ## Modules
//!
//! - [`bridge`]: resolution, spec application, coercion, truthiness, module loading, observers
//! - [`processing`]: map / mapcat / filter operations driven by resolved callables
//! - [`execution`]: parallel chunked execution of spec-driven operations with metrics
//! - [`types`]: values, tuples, schemas and datasets
//! - [`error`]: error types

pub mod bridge;
pub mod error;
pub mod execution;
pub mod processing;
pub mod types;

pub use error::{
    ApplicationError, BridgeError, BridgeResult, CallError, LoadError, ResolutionCause,
    ResolutionError, SpecError,
};
