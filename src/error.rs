use thiserror::Error;

use crate::bridge::callable::Arity;

/// Convenience result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Top-level error returned by operation setup and tuple processing.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The function specification was malformed.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// The namespace could not be loaded or the symbol is missing / not callable.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Binding the spec's extra literal arguments failed.
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// A resolved callable failed while processing a tuple.
    #[error("call failed: {0}")]
    Call(#[from] CallError),

    /// An operation produced a tuple whose arity does not match its declared output schema.
    #[error("output tuple has arity {actual} but the output schema declares {expected} field(s)")]
    ArityMismatch { expected: usize, actual: usize },
}

/// A function specification did not have the `[namespace, name, args..]` shape.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Fewer than two elements.
    #[error("function spec needs at least a namespace and a name, got {len} element(s)")]
    TooShort { len: usize },

    /// Slot 0 or 1 held something other than a string.
    #[error("function spec element {index} must be a string, found {found}")]
    NotAString { index: usize, found: &'static str },

    /// A literal argument has no [`crate::types::Value`] counterpart (e.g. a JSON object).
    #[error("function spec argument {index} is not a supported literal ({found})")]
    UnsupportedLiteral { index: usize, found: &'static str },

    /// The spec text was not valid JSON.
    #[error("invalid function spec json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by a [`crate::bridge::loader::ModuleLoader`] while loading a module path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Nothing is registered under the module path.
    #[error("no module found at path '{path}'")]
    NotFound { path: String },

    /// The module exists but could not be initialised.
    #[error("module '{path}' failed to load: {message}")]
    Failed { path: String, message: String },
}

/// Why a `(namespace, name)` pair could not be turned into a callable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolutionCause {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("symbol is not defined in the namespace")]
    MissingSymbol,

    #[error("symbol is bound to a non-callable {kind}")]
    NotCallable { kind: &'static str },
}

/// Resolution of `namespace/name` failed. The cause is always available via `source()`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot resolve '{namespace}/{name}': {cause}")]
pub struct ResolutionError {
    pub namespace: String,
    pub name: String,
    #[source]
    pub cause: ResolutionCause,
}

impl ResolutionError {
    pub(crate) fn new(namespace: &str, name: &str, cause: ResolutionCause) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            cause,
        }
    }
}

/// Applying a spec's extra literal arguments failed. The cause is always available via `source()`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot apply arguments of spec {spec}: {cause}")]
pub struct ApplicationError {
    /// Rendered form of the offending spec.
    pub spec: String,
    #[source]
    pub cause: CallError,
}

/// Error raised by a callable's own argument handling or body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    /// Invoked with an argument count outside the callable's arity.
    #[error("'{name}' expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: Arity,
        got: usize,
    },

    /// More arguments were bound than the callable accepts.
    #[error("'{name}' accepts {expected} argument(s), cannot bind {bound}")]
    Saturated {
        name: String,
        expected: Arity,
        bound: usize,
    },

    /// An argument had the wrong shape.
    #[error("'{name}': {message}")]
    Type { name: String, message: String },

    /// A higher-order function returned something that cannot be called.
    #[error("'{name}' returned a non-callable {kind}")]
    NotCallable { name: String, kind: &'static str },

    /// Any other failure raised by the callable body.
    #[error("'{name}' failed: {message}")]
    Failed { name: String, message: String },
}

impl CallError {
    /// Shorthand for [`CallError::Type`].
    pub fn type_error(name: &str, message: impl Into<String>) -> Self {
        CallError::Type {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// Shorthand for [`CallError::Failed`].
    pub fn failed(name: &str, message: impl Into<String>) -> Self {
        CallError::Failed {
            name: name.to_string(),
            message: message.into(),
        }
    }
}
