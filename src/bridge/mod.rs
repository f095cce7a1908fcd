//! The bridge between pipeline tuples and scripting-environment functions.
//!
//! Four pieces, all stateless:
//!
//! - [`resolve_callable`]: load a namespace through a [`ModuleLoader`] and fetch a callable
//! - [`apply_spec`]: resolve a [`FunctionSpec`] and partially apply its literal arguments
//! - [`to_sequence`] / [`to_tuple`]: convert tuples to argument sequences and results to tuples
//! - [`is_truthy`]: nil/false truthiness for filter-style operations
//!
//! [`Bridge`] bundles a loader with an optional [`BridgeObserver`] for callers that want
//! resolution outcomes logged.
//!
//! ## Example
//!
//! ```rust
//! use pipeline_fn_bridge::bridge::{apply_spec, to_sequence, to_tuple, Arity, FunctionSpec, Module, ModuleRegistry};
//! use pipeline_fn_bridge::types::{Tuple, Value};
//!
//! let registry = ModuleRegistry::new().with_module(
//!     Module::new("math-utils").define_fn("add", Arity::AtLeast(0), |args| {
//!         Ok(Value::Int64(args.iter().map(|v| match v { Value::Int64(n) => *n, _ => 0 }).sum()))
//!     }),
//! );
//!
//! let spec = FunctionSpec::from_json_str(r#"["math-utils", "add", 5]"#).unwrap();
//! let add5 = apply_spec(&registry, &spec).unwrap();
//!
//! let input = Tuple::new(vec![Value::Int64(3)]);
//! let out = add5.apply_to(to_sequence(&input).cloned()).unwrap();
//! assert_eq!(to_tuple(&out), Tuple::new(vec![Value::Int64(8)]));
//! ```

pub mod applier;
pub mod callable;
pub mod coerce;
pub mod loader;
pub mod observer;
pub mod resolver;
pub mod spec;
pub mod truthy;

use std::fmt;
use std::sync::Arc;

use crate::error::{BridgeError, BridgeResult};

pub use applier::{apply_factory_spec, apply_spec, apply_spec_values};
pub use callable::{Arity, Callable, Partial};
pub use coerce::{into_tuple, to_sequence, to_tuple, Sequence};
pub use loader::{module_path, Module, ModuleLoader, ModuleRegistry};
pub use observer::{
    BridgeContext, BridgeObserver, BridgeSeverity, CompositeObserver, FileObserver, StdErrObserver,
};
pub use resolver::resolve_callable;
pub use spec::FunctionSpec;
pub use truthy::is_truthy;

/// Options controlling [`Bridge`] reporting.
#[derive(Clone)]
pub struct BridgeOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn BridgeObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: BridgeSeverity,
}

impl fmt::Debug for BridgeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: BridgeSeverity::Critical,
        }
    }
}

/// A [`ModuleLoader`] plus reporting options.
///
/// Every call resolves afresh; cache the returned [`Callable`] if you need to.
#[derive(Clone)]
pub struct Bridge {
    loader: Arc<dyn ModuleLoader>,
    opts: BridgeOptions,
}

impl Bridge {
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self::with_options(loader, BridgeOptions::default())
    }

    pub fn with_options(loader: Arc<dyn ModuleLoader>, opts: BridgeOptions) -> Self {
        Self { loader, opts }
    }

    /// The underlying loader.
    pub fn loader(&self) -> &dyn ModuleLoader {
        self.loader.as_ref()
    }

    /// See [`resolve_callable`].
    pub fn resolve_callable(&self, namespace: &str, name: &str) -> BridgeResult<Callable> {
        let ctx = BridgeContext {
            namespace: namespace.to_string(),
            name: name.to_string(),
            bound_args: 0,
        };
        let out = resolve_callable(self.loader(), namespace, name).map_err(BridgeError::from);
        self.report(&ctx, out)
    }

    /// See [`apply_spec`].
    pub fn apply_spec(&self, spec: &FunctionSpec) -> BridgeResult<Callable> {
        let out = apply_spec(self.loader(), spec);
        self.report(&context_of(spec), out)
    }

    /// See [`apply_factory_spec`].
    pub fn apply_factory_spec(&self, spec: &FunctionSpec) -> BridgeResult<Callable> {
        let out = apply_factory_spec(self.loader(), spec);
        self.report(&context_of(spec), out)
    }

    fn report(&self, ctx: &BridgeContext, out: BridgeResult<Callable>) -> BridgeResult<Callable> {
        let Some(obs) = &self.opts.observer else {
            return out;
        };
        match &out {
            Ok(_) => obs.on_resolved(ctx),
            Err(e) => {
                let severity = BridgeSeverity::of(e);
                obs.on_failure(ctx, severity, e);
                if severity >= self.opts.alert_at_or_above {
                    obs.on_alert(ctx, severity, e);
                }
            }
        }
        out
    }
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge").field("opts", &self.opts).finish()
    }
}

fn context_of(spec: &FunctionSpec) -> BridgeContext {
    BridgeContext {
        namespace: spec.namespace().to_string(),
        name: spec.name().to_string(),
        bound_args: spec.bound_args().len(),
    }
}
