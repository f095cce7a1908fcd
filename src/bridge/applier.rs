//! Turn a [`FunctionSpec`] into a ready-to-invoke callable.

use crate::bridge::callable::Callable;
use crate::bridge::loader::ModuleLoader;
use crate::bridge::resolver::resolve_callable;
use crate::bridge::spec::FunctionSpec;
use crate::error::{ApplicationError, BridgeResult, CallError};
use crate::types::Value;

/// Resolve `spec` and partially apply its literal arguments.
///
/// With no literals the resolved callable is returned as is. Otherwise the result calls the
/// resolved function with the literals (left to right) followed by the invocation arguments.
///
/// Resolution failures surface as [`crate::BridgeError::Resolution`], binding failures as
/// [`crate::BridgeError::Application`].
pub fn apply_spec(loader: &dyn ModuleLoader, spec: &FunctionSpec) -> BridgeResult<Callable> {
    let base = resolve_callable(loader, spec.namespace(), spec.name())?;
    if spec.bound_args().is_empty() {
        return Ok(base);
    }
    let bound = base
        .bind(spec.bound_args().to_vec())
        .map_err(|cause| application_error(spec, cause))?;
    Ok(bound)
}

/// [`apply_spec`] over a raw `[namespace, name, args..]` sequence, validating its shape first.
pub fn apply_spec_values(loader: &dyn ModuleLoader, values: &[Value]) -> BridgeResult<Callable> {
    let spec = FunctionSpec::from_values(values)?;
    apply_spec(loader, &spec)
}

/// Resolve `spec` as a function factory.
///
/// With no literals this is [`apply_spec`]. Otherwise the resolved function is called once with
/// the literals and must return a callable, which is what gets installed.
pub fn apply_factory_spec(loader: &dyn ModuleLoader, spec: &FunctionSpec) -> BridgeResult<Callable> {
    let factory = resolve_callable(loader, spec.namespace(), spec.name())?;
    if spec.bound_args().is_empty() {
        return Ok(factory);
    }
    let produced = factory
        .call(spec.bound_args())
        .map_err(|cause| application_error(spec, cause))?;
    match produced {
        Value::Fn(f) => Ok(f),
        other => Err(application_error(
            spec,
            CallError::NotCallable {
                name: factory.name().to_string(),
                kind: other.kind(),
            },
        )
        .into()),
    }
}

fn application_error(spec: &FunctionSpec, cause: CallError) -> ApplicationError {
    ApplicationError {
        spec: spec.to_string(),
        cause,
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::{apply_factory_spec, apply_spec, apply_spec_values};
    use crate::bridge::callable::{Arity, Callable};
    use crate::bridge::loader::{Module, ModuleRegistry};
    use crate::bridge::resolver::resolve_callable;
    use crate::bridge::spec::FunctionSpec;
    use crate::error::{BridgeError, CallError, SpecError};
    use crate::types::Value;

    fn registry() -> ModuleRegistry {
        ModuleRegistry::new().with_module(
            Module::new("math-utils")
                .define_fn("add", Arity::AtLeast(0), |args| {
                    let mut total = 0i64;
                    for a in args {
                        match a {
                            Value::Int64(v) => total += v,
                            other => {
                                return Err(CallError::type_error(
                                    "add",
                                    format!("cannot add {}", other.kind()),
                                ));
                            }
                        }
                    }
                    Ok(Value::Int64(total))
                })
                .define_fn("args", Arity::AtLeast(0), |args| Ok(Value::List(args.to_vec())))
                .define_fn("pair", Arity::Exact(2), |args| Ok(Value::List(args.to_vec())))
                .define_fn("adder", Arity::Exact(1), |args| {
                    let n = match &args[0] {
                        Value::Int64(n) => *n,
                        other => {
                            return Err(CallError::type_error(
                                "adder",
                                format!("expected int64, got {}", other.kind()),
                            ));
                        }
                    };
                    Ok(Value::Fn(Callable::native("adder*", Arity::Exact(1), move |xs| {
                        match &xs[0] {
                            Value::Int64(x) => Ok(Value::Int64(n + x)),
                            other => Ok(other.clone()),
                        }
                    })))
                }),
        )
    }

    #[test]
    fn two_element_spec_is_plain_resolution() {
        let reg = registry();
        let via_spec = apply_spec(&reg, &FunctionSpec::new("math-utils", "add")).unwrap();
        let direct = resolve_callable(&reg, "math-utils", "add").unwrap();
        assert_eq!(via_spec, direct);
        assert!(via_spec.bound_args().is_empty());
    }

    #[test]
    fn add_five_then_three_is_eight() {
        let reg = registry();
        let spec = FunctionSpec::from_json_str(r#"["math-utils", "add", 5]"#).unwrap();
        let f = apply_spec(&reg, &spec).unwrap();
        assert_eq!(f.call(&[Value::Int64(3)]).unwrap(), Value::Int64(8));
    }

    #[test]
    fn bound_arguments_come_first_in_spec_order() {
        let reg = registry();
        let spec = FunctionSpec::new("math-utils", "args").with_args([Value::from("a"), Value::from("b")]);
        let g = apply_spec(&reg, &spec).unwrap();
        assert_eq!(
            g.call(&[Value::from("x")]).unwrap(),
            Value::List(vec![Value::from("a"), Value::from("b"), Value::from("x")])
        );
    }

    #[test]
    fn over_binding_is_an_application_error() {
        let reg = registry();
        let spec = FunctionSpec::new("math-utils", "pair")
            .with_args([Value::Int64(1), Value::Int64(2), Value::Int64(3)]);
        let err = apply_spec(&reg, &spec).unwrap_err();
        match err {
            BridgeError::Application(app) => {
                assert!(matches!(app.cause, CallError::Saturated { bound: 3, .. }));
                assert!(app.source().is_some());
                assert_eq!(app.spec, "[math-utils pair 1 2 3]");
            }
            other => panic!("expected application error, got {other:?}"),
        }
    }

    #[test]
    fn resolution_errors_pass_through_unchanged() {
        let reg = registry();
        let spec = FunctionSpec::new("math-utils", "nope").with_args([Value::Int64(1)]);
        assert!(matches!(apply_spec(&reg, &spec), Err(BridgeError::Resolution(_))));
    }

    #[test]
    fn raw_values_are_validated_before_resolution() {
        let reg = registry();
        let f = apply_spec_values(
            &reg,
            &[Value::from("math-utils"), Value::from("add"), Value::Int64(1)],
        )
        .unwrap();
        assert_eq!(f.call(&[Value::Int64(1)]).unwrap(), Value::Int64(2));

        assert!(matches!(
            apply_spec_values(&reg, &[Value::from("math-utils")]),
            Err(BridgeError::Spec(SpecError::TooShort { len: 1 }))
        ));
    }

    #[test]
    fn factory_spec_calls_through_to_build_the_function() {
        let reg = registry();
        let spec = FunctionSpec::new("math-utils", "adder").with_args([Value::Int64(10)]);
        let f = apply_factory_spec(&reg, &spec).unwrap();
        assert_eq!(f.name(), "adder*");
        assert_eq!(f.call(&[Value::Int64(5)]).unwrap(), Value::Int64(15));
    }

    #[test]
    fn factory_spec_rejects_non_callable_results_and_body_errors() {
        let reg = registry();
        let scalar = FunctionSpec::new("math-utils", "add").with_args([Value::Int64(1)]);
        match apply_factory_spec(&reg, &scalar).unwrap_err() {
            BridgeError::Application(app) => assert_eq!(
                app.cause,
                CallError::NotCallable {
                    name: "add".to_string(),
                    kind: "int64"
                }
            ),
            other => panic!("expected application error, got {other:?}"),
        }

        let bad_arg = FunctionSpec::new("math-utils", "adder").with_args([Value::from("ten")]);
        assert!(matches!(
            apply_factory_spec(&reg, &bad_arg),
            Err(BridgeError::Application(_))
        ));
    }
}
