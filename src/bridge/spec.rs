//! Function specifications: `[namespace, name, literal args..]`.

use std::fmt;

use serde::ser::{Error as _, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::SpecError;
use crate::types::Value;

/// Describes how to resolve a function and which leading arguments to bind to it.
///
/// Deserializes from a JSON array such as `["math-utils", "add", 5]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<serde_json::Value>")]
pub struct FunctionSpec {
    namespace: String,
    name: String,
    bound_args: Vec<Value>,
}

impl FunctionSpec {
    /// A spec with no bound arguments.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            bound_args: Vec::new(),
        }
    }

    /// Append literal arguments to bind, in order.
    pub fn with_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.bound_args.extend(args);
        self
    }

    /// Validate a raw `[namespace, name, args..]` sequence.
    pub fn from_values(values: &[Value]) -> Result<Self, SpecError> {
        if values.len() < 2 {
            return Err(SpecError::TooShort { len: values.len() });
        }
        let namespace = expect_string(&values[0], 0)?;
        let name = expect_string(&values[1], 1)?;
        Ok(Self {
            namespace,
            name,
            bound_args: values[2..].to_vec(),
        })
    }

    /// Parse the JSON array form.
    pub fn from_json_str(s: &str) -> Result<Self, SpecError> {
        let raw: Vec<serde_json::Value> = serde_json::from_str(s)?;
        Self::try_from(raw)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Literal arguments bound ahead of invocation arguments.
    pub fn bound_args(&self) -> &[Value] {
        &self.bound_args
    }

    /// Total element count, namespace and name included.
    pub fn len(&self) -> usize {
        2 + self.bound_args.len()
    }

    /// Always `false`: a spec has at least a namespace and a name.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The raw sequence form.
    pub fn to_values(&self) -> Vec<Value> {
        let mut out = Vec::with_capacity(self.len());
        out.push(Value::Utf8(self.namespace.clone()));
        out.push(Value::Utf8(self.name.clone()));
        out.extend(self.bound_args.iter().cloned());
        out
    }
}

fn expect_string(value: &Value, index: usize) -> Result<String, SpecError> {
    match value {
        Value::Utf8(s) => Ok(s.clone()),
        other => Err(SpecError::NotAString {
            index,
            found: other.kind(),
        }),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl TryFrom<Vec<serde_json::Value>> for FunctionSpec {
    type Error = SpecError;

    fn try_from(raw: Vec<serde_json::Value>) -> Result<Self, Self::Error> {
        if raw.len() < 2 {
            return Err(SpecError::TooShort { len: raw.len() });
        }
        let mut values = Vec::with_capacity(raw.len());
        for (index, item) in raw.iter().enumerate() {
            let value = match item {
                serde_json::Value::String(s) => Value::Utf8(s.clone()),
                other if index < 2 => {
                    return Err(SpecError::NotAString {
                        index,
                        found: json_kind(other),
                    });
                }
                other => Value::from_json(other).ok_or(SpecError::UnsupportedLiteral {
                    index,
                    found: json_kind(other),
                })?,
            };
            values.push(value);
        }
        Self::from_values(&values)
    }
}

impl Serialize for FunctionSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        seq.serialize_element(&self.namespace)?;
        seq.serialize_element(&self.name)?;
        for arg in &self.bound_args {
            let json = arg
                .to_json()
                .ok_or_else(|| S::Error::custom(format!("cannot serialize {} literal", arg.kind())))?;
            seq.serialize_element(&json)?;
        }
        seq.end()
    }
}

impl fmt::Display for FunctionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}", self.namespace, self.name)?;
        for arg in &self.bound_args {
            match arg.to_json() {
                Some(json) => write!(f, " {json}")?,
                None => write!(f, " #<{}>", arg.kind())?,
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::FunctionSpec;
    use crate::error::SpecError;
    use crate::types::Value;

    #[test]
    fn parses_json_array_form() {
        let spec = FunctionSpec::from_json_str(r#"["math-utils", "add", 5, "x", [1, 2]]"#).unwrap();
        assert_eq!(spec.namespace(), "math-utils");
        assert_eq!(spec.name(), "add");
        assert_eq!(
            spec.bound_args(),
            &[
                Value::Int64(5),
                Value::Utf8("x".to_string()),
                Value::List(vec![Value::Int64(1), Value::Int64(2)])
            ]
        );
        assert_eq!(spec.len(), 5);
    }

    #[test]
    fn deserializes_inside_other_config() {
        #[derive(serde::Deserialize)]
        struct OpConfig {
            function: FunctionSpec,
        }
        let cfg: OpConfig = serde_json::from_str(r#"{"function": ["ns", "f", true]}"#).unwrap();
        assert_eq!(cfg.function, FunctionSpec::new("ns", "f").with_args([Value::Bool(true)]));

        let bad = serde_json::from_str::<OpConfig>(r#"{"function": ["ns"]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn rejects_short_and_non_string_heads() {
        assert!(matches!(
            FunctionSpec::from_json_str(r#"["ns"]"#),
            Err(SpecError::TooShort { len: 1 })
        ));
        assert!(matches!(
            FunctionSpec::from_json_str(r#"["ns", 3]"#),
            Err(SpecError::NotAString { index: 1, found: "number" })
        ));
        assert!(matches!(
            FunctionSpec::from_values(&[Value::Null, Value::from("f")]),
            Err(SpecError::NotAString { index: 0, found: "null" })
        ));
        assert!(matches!(
            FunctionSpec::from_json_str(r#"["ns", "f", {"k": 1}]"#),
            Err(SpecError::UnsupportedLiteral { index: 2, found: "object" })
        ));
        assert!(matches!(
            FunctionSpec::from_json_str("not json"),
            Err(SpecError::Json(_))
        ));
    }

    #[test]
    fn integers_beyond_i64_are_rejected_not_widened() {
        assert!(matches!(
            FunctionSpec::from_json_str(r#"["ns", "f", 18446744073709551615]"#),
            Err(SpecError::UnsupportedLiteral { index: 2, .. })
        ));
        assert!(matches!(
            FunctionSpec::from_json_str(r#"["ns", "f", [1, 9223372036854775808]]"#),
            Err(SpecError::UnsupportedLiteral { index: 2, .. })
        ));

        let spec =
            FunctionSpec::from_json_str(r#"["ns", "f", 9223372036854775807, -1, 2.5]"#).unwrap();
        assert_eq!(
            spec.bound_args(),
            &[Value::Int64(i64::MAX), Value::Int64(-1), Value::Float64(2.5)]
        );
    }

    #[test]
    fn serializes_back_to_array_form() {
        let spec = FunctionSpec::new("math-utils", "add").with_args([Value::Int64(5)]);
        assert_eq!(serde_json::to_string(&spec).unwrap(), r#"["math-utils","add",5]"#);
        assert_eq!(spec.to_string(), "[math-utils add 5]");
        assert_eq!(
            spec.to_values(),
            vec![Value::from("math-utils"), Value::from("add"), Value::Int64(5)]
        );
    }
}
