//! The module-loading collaborator the resolver depends on.
//!
//! [`ModuleLoader`] is the seam between the bridge and whatever hosts the scripting environment.
//! [`ModuleRegistry`] is an in-process implementation backed by Rust-defined [`Module`]s.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::bridge::callable::{Arity, Callable};
use crate::error::{CallError, LoadError};
use crate::types::Value;

/// Capability to load modules by path and look symbols up in loaded namespaces.
///
/// `load` must be idempotent and safe to call concurrently from several worker threads; it may
/// block until the module is ready.
pub trait ModuleLoader: Send + Sync {
    /// Make sure the module stored at `path` is loaded.
    fn load(&self, path: &str) -> Result<(), LoadError>;

    /// Value bound to `name` in the loaded `namespace`, if any.
    fn lookup_symbol(&self, namespace: &str, name: &str) -> Option<Value>;
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for Arc<L> {
    fn load(&self, path: &str) -> Result<(), LoadError> {
        (**self).load(path)
    }

    fn lookup_symbol(&self, namespace: &str, name: &str) -> Option<Value> {
        (**self).lookup_symbol(namespace, name)
    }
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for &L {
    fn load(&self, path: &str) -> Result<(), LoadError> {
        (**self).load(path)
    }

    fn lookup_symbol(&self, namespace: &str, name: &str) -> Option<Value> {
        (**self).lookup_symbol(namespace, name)
    }
}

/// Map a namespace to the path its module is stored under: `-` becomes `_`, `.` becomes `/`.
pub fn module_path(namespace: &str) -> String {
    namespace
        .chars()
        .map(|c| match c {
            '-' => '_',
            '.' => '/',
            other => other,
        })
        .collect()
}

/// A namespace and the symbols it defines.
#[derive(Debug, Clone)]
pub struct Module {
    namespace: String,
    symbols: HashMap<String, Value>,
}

impl Module {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            symbols: HashMap::new(),
        }
    }

    /// Bind `name` to a plain value.
    pub fn define(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.symbols.insert(name.into(), value.into());
        self
    }

    /// Bind `name` to a native function.
    pub fn define_fn<F>(self, name: impl Into<String>, arity: Arity, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        let name = name.into();
        let callable = Callable::native(name.clone(), arity, f);
        self.define(name, callable)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Path this module is registered under, see [`module_path`].
    pub fn path(&self) -> String {
        module_path(&self.namespace)
    }
}

#[derive(Debug, Clone)]
enum Source {
    Ready(Module),
    Broken(String),
}

#[derive(Default)]
struct Environment {
    loaded_paths: HashSet<String>,
    namespaces: HashMap<String, HashMap<String, Value>>,
}

/// In-process [`ModuleLoader`].
///
/// Modules are registered up front and installed into the live environment on first `load`.
/// Later loads of the same path are no-ops, including concurrent ones.
#[derive(Default)]
pub struct ModuleRegistry {
    sources: RwLock<HashMap<String, Source>>,
    env: RwLock<Environment>,
    installs: AtomicUsize,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `module` loadable under its [`Module::path`].
    ///
    /// Namespaces that normalize to the same path (`a-b` and `a_b`) share one slot. The module
    /// previously registered there, if any, is returned.
    pub fn register(&self, module: Module) -> Option<Module> {
        let path = module.path();
        let namespace = module.namespace.clone();
        let mut sources = self.sources.write().unwrap_or_else(PoisonError::into_inner);
        match sources.insert(path.clone(), Source::Ready(module))? {
            Source::Ready(displaced) => {
                tracing::warn!(
                    path = %path,
                    namespace = %namespace,
                    displaced = %displaced.namespace,
                    "module registration replaced an existing module"
                );
                Some(displaced)
            }
            Source::Broken(_) => {
                tracing::warn!(
                    path = %path,
                    namespace = %namespace,
                    "module registration replaced a broken module"
                );
                None
            }
        }
    }

    /// Builder-style [`Self::register`].
    pub fn with_module(self, module: Module) -> Self {
        let _ = self.register(module);
        self
    }

    /// Register a namespace whose load always fails with `message`.
    pub fn register_broken(&self, namespace: &str, message: impl Into<String>) {
        let mut sources = self.sources.write().unwrap_or_else(PoisonError::into_inner);
        sources.insert(module_path(namespace), Source::Broken(message.into()));
    }

    /// `true` once the module for `namespace` has been installed.
    pub fn is_loaded(&self, namespace: &str) -> bool {
        let env = self.env.read().unwrap_or_else(PoisonError::into_inner);
        env.namespaces.contains_key(namespace)
    }

    /// Number of times a module was actually installed (as opposed to requested).
    pub fn installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered = self
            .sources
            .read()
            .map(|s| s.len())
            .unwrap_or_default();
        f.debug_struct("ModuleRegistry")
            .field("registered", &registered)
            .field("installs", &self.installs())
            .finish()
    }
}

impl ModuleLoader for ModuleRegistry {
    fn load(&self, path: &str) -> Result<(), LoadError> {
        {
            let env = self.env.read().unwrap_or_else(PoisonError::into_inner);
            if env.loaded_paths.contains(path) {
                return Ok(());
            }
        }

        let source = {
            let sources = self.sources.read().unwrap_or_else(PoisonError::into_inner);
            sources.get(path).cloned()
        };
        let module = match source {
            None => {
                return Err(LoadError::NotFound {
                    path: path.to_string(),
                });
            }
            Some(Source::Broken(message)) => {
                return Err(LoadError::Failed {
                    path: path.to_string(),
                    message,
                });
            }
            Some(Source::Ready(module)) => module,
        };

        let mut env = self.env.write().unwrap_or_else(PoisonError::into_inner);
        // Another worker may have installed it while we waited for the write lock.
        if !env.loaded_paths.insert(path.to_string()) {
            return Ok(());
        }
        tracing::debug!(path = path, namespace = %module.namespace, "installing module");
        env.namespaces.insert(module.namespace, module.symbols);
        self.installs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn lookup_symbol(&self, namespace: &str, name: &str) -> Option<Value> {
        let env = self.env.read().unwrap_or_else(PoisonError::into_inner);
        env.namespaces.get(namespace)?.get(name).cloned()
    }
}
