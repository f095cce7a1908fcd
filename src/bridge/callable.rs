//! Invocable values handed out by the resolver.

use std::fmt;
use std::sync::Arc;

use crate::error::CallError;
use crate::types::Value;

/// How many arguments a [`Callable`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` arguments.
    Exact(usize),
    /// `n` or more arguments.
    AtLeast(usize),
}

impl Arity {
    /// `true` if a call with `n` arguments is allowed.
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exact(want) => n == want,
            Arity::AtLeast(min) => n >= min,
        }
    }

    /// Arity left over once `bound` leading arguments are fixed, or `None` if that overflows it.
    pub fn after_binding(self, bound: usize) -> Option<Arity> {
        match self {
            Arity::Exact(want) => want.checked_sub(bound).map(Arity::Exact),
            Arity::AtLeast(min) => Some(Arity::AtLeast(min.saturating_sub(bound))),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "{n} or more"),
        }
    }
}

type NativeFn = dyn Fn(&[Value]) -> Result<Value, CallError> + Send + Sync;

/// A callable with leading arguments already fixed.
///
/// Invoking it concatenates `bound` and the invocation arguments, then delegates to `base`.
pub struct Partial {
    base: Callable,
    bound: Vec<Value>,
}

impl Partial {
    /// Call `base` with the bound arguments followed by `remaining`.
    pub fn apply(&self, remaining: &[Value]) -> Result<Value, CallError> {
        let mut args = Vec::with_capacity(self.bound.len() + remaining.len());
        args.extend_from_slice(&self.bound);
        args.extend_from_slice(remaining);
        self.base.call(&args)
    }
}

enum Body {
    Native(Box<NativeFn>),
    Partial(Partial),
}

struct Inner {
    name: String,
    arity: Arity,
    body: Body,
}

/// Handle to a scripting-environment function.
///
/// Cloning is cheap and shares the underlying function. Two handles compare equal only if they
/// share it.
#[derive(Clone)]
pub struct Callable(Arc<Inner>);

impl Callable {
    /// Wrap a Rust closure as a callable.
    pub fn native<F>(name: impl Into<String>, arity: Arity, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self(Arc::new(Inner {
            name: name.into(),
            arity,
            body: Body::Native(Box::new(f)),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn arity(&self) -> Arity {
        self.0.arity
    }

    /// Leading arguments fixed by [`Callable::bind`]; empty for plain functions.
    pub fn bound_args(&self) -> &[Value] {
        match &self.0.body {
            Body::Partial(p) => &p.bound,
            Body::Native(_) => &[],
        }
    }

    /// Invoke with `args`.
    pub fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        if !self.0.arity.accepts(args.len()) {
            return Err(CallError::Arity {
                name: self.0.name.clone(),
                expected: self.0.arity,
                got: args.len(),
            });
        }
        match &self.0.body {
            Body::Native(f) => f(args),
            Body::Partial(p) => p.apply(args),
        }
    }

    /// Invoke with the values produced by `args`, consuming them once.
    pub fn apply_to<I>(&self, args: I) -> Result<Value, CallError>
    where
        I: IntoIterator<Item = Value>,
    {
        let args: Vec<Value> = args.into_iter().collect();
        self.call(&args)
    }

    /// Fix `args` as the leading arguments of every future call.
    ///
    /// Binding nothing returns the same callable. Binding more arguments than an exact arity
    /// allows fails with [`CallError::Saturated`].
    pub fn bind(&self, args: Vec<Value>) -> Result<Callable, CallError> {
        if args.is_empty() {
            return Ok(self.clone());
        }
        let arity = self
            .0
            .arity
            .after_binding(args.len())
            .ok_or_else(|| CallError::Saturated {
                name: self.0.name.clone(),
                expected: self.0.arity,
                bound: args.len(),
            })?;
        tracing::debug!(function = %self.0.name, bound = args.len(), "bound leading arguments");
        Ok(Self(Arc::new(Inner {
            name: self.0.name.clone(),
            arity,
            body: Body::Partial(Partial {
                base: self.clone(),
                bound: args,
            }),
        })))
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.0.name)
            .field("arity", &self.0.arity)
            .field("bound_args", &self.bound_args().len())
            .finish()
    }
}
