//! Resolve `(namespace, name)` pairs into callables.

use crate::bridge::callable::Callable;
use crate::bridge::loader::{module_path, ModuleLoader};
use crate::error::{ResolutionCause, ResolutionError};
use crate::types::Value;

/// Load the module behind `namespace` and return the callable bound to `name` in it.
///
/// The load is requested on every call; deduplicating it is the loader's job. Nothing is cached
/// here.
pub fn resolve_callable(
    loader: &dyn ModuleLoader,
    namespace: &str,
    name: &str,
) -> Result<Callable, ResolutionError> {
    let path = module_path(namespace);
    loader
        .load(&path)
        .map_err(|e| ResolutionError::new(namespace, name, ResolutionCause::Load(e)))?;

    match loader.lookup_symbol(namespace, name) {
        Some(Value::Fn(f)) => {
            tracing::debug!(namespace = namespace, symbol = name, "resolved callable");
            Ok(f)
        }
        Some(other) => Err(ResolutionError::new(
            namespace,
            name,
            ResolutionCause::NotCallable { kind: other.kind() },
        )),
        None => Err(ResolutionError::new(
            namespace,
            name,
            ResolutionCause::MissingSymbol,
        )),
    }
}
