//! Placeholder values and value mappings

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

/// Reserved key of a nested mapping holding its own template string
pub const TEMPLATE_KEY: &str = "template";

/// A value bound to a placeholder token
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawValue")]
pub enum Value {
    /// Leaves the token untouched, exactly like an absent key
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// A sub-mapping, renderable only when it carries a template
    Nested(NestedValue),
}

impl Value {
    /// Whether this value renders directly through string coercion
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Text(_) | Value::Integer(_) | Value::Float(_) | Value::Bool(_)
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Text(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => format_float(*x, f),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Nested(nested) => match &nested.template {
                Some(template) => f.write_str(template),
                None => f.write_str("[mapping]"),
            },
        }
    }
}

/// Format floats the way release values are written by hand: `2.0` as `2`,
/// non-finite values spelled out
fn format_float(x: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if x.is_nan() {
        f.write_str("NaN")
    } else if x.is_infinite() {
        f.write_str(if x > 0.0 { "Infinity" } else { "-Infinity" })
    } else if x == 0.0 {
        // -0 renders as 0
        f.write_str("0")
    } else {
        write!(f, "{}", x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => Value::Integer(n),
            Err(_) => Value::Float(n as f64),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NestedValue> for Value {
    fn from(nested: NestedValue) -> Self {
        Value::Nested(nested)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A nested mapping value, optionally carrying its own template
///
/// The template is resolved against `values`, i.e. the rest of the mapping
/// without the `template` key itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NestedValue {
    pub template: Option<String>,
    pub values: ValueMap,
}

impl NestedValue {
    /// Create a nested value rendered through `template`
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            values: ValueMap::new(),
        }
    }

    /// Create a nested mapping with no template
    pub fn without_template() -> Self {
        Self::default()
    }

    /// Bind a token inside this nested mapping
    pub fn with(mut self, token: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(token, value);
        self
    }
}

/// Mapping from token name (e.g. `$RELEASE_TAG`) to its value
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ValueMap(HashMap<String, Value>);

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, token: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(token, value);
        self
    }

    /// Bind a token, returning the value it replaced
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(token.into(), value.into())
    }

    pub fn get(&self, token: &str) -> Option<&Value> {
        self.0.get(token)
    }

    pub fn contains_key(&self, token: &str) -> bool {
        self.0.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overlay every binding of `other` onto this mapping
    pub fn merge(&mut self, other: ValueMap) {
        self.0.extend(other.0);
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Untyped shape of a value as it appears in JSON or TOML
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Map(HashMap<String, RawValue>),
    Null,
}

impl TryFrom<RawValue> for Value {
    type Error = String;

    fn try_from(raw: RawValue) -> Result<Self, Self::Error> {
        Ok(match raw {
            RawValue::Null => Value::Null,
            RawValue::Bool(b) => Value::Bool(b),
            RawValue::Integer(n) => Value::Integer(n),
            RawValue::Float(x) => Value::Float(x),
            RawValue::Text(s) => Value::Text(s),
            RawValue::Map(mut entries) => {
                let template = match entries.remove(TEMPLATE_KEY) {
                    None | Some(RawValue::Null) => None,
                    Some(RawValue::Text(s)) => Some(s),
                    Some(_) => return Err(format!("`{}` must be a string", TEMPLATE_KEY)),
                };
                let values = entries
                    .into_iter()
                    .map(|(k, v)| Value::try_from(v).map(|v| (k, v)))
                    .collect::<Result<HashMap<_, _>, _>>()?;
                Value::Nested(NestedValue {
                    template,
                    values: ValueMap(values),
                })
            }
        })
    }
}
