//! Dynamically shaped values flowing in and out of SDK operations.

use crate::error::SdkError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A typed SDK data object (request details, response model, ...).
///
/// This is the serialize capability generated models implement directly.
/// `to_dict` is the canonical conversion; `fields` is the fallback view used
/// when `to_dict` fails.
pub trait SdkModel: fmt::Debug + Send + Sync {
    /// Class name, e.g. `CreateVcnDetails`
    fn type_name(&self) -> &str;

    fn to_dict(&self) -> Result<Value, SdkError>;

    /// Raw attribute view. Names starting with `_` are private.
    fn fields(&self) -> Option<Vec<(String, SdkValue)>> {
        None
    }

    /// Last-resort string form
    fn describe(&self) -> String {
        format!("<{} object>", self.type_name())
    }
}

/// Model backed by any `serde::Serialize` type.
#[derive(Debug, Clone)]
pub struct SerdeModel<T> {
    type_name: String,
    inner: T,
}

impl<T> SerdeModel<T> {
    pub fn new(type_name: impl Into<String>, inner: T) -> Self {
        Self {
            type_name: type_name.into(),
            inner,
        }
    }
}

impl<T> SdkModel for SerdeModel<T>
where
    T: Serialize + fmt::Debug + Send + Sync,
{
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn to_dict(&self) -> Result<Value, SdkError> {
        serde_json::to_value(&self.inner)
            .map_err(|e| SdkError::Other(format!("{}: {}", self.type_name, e)))
    }
}

/// Model that keeps its attributes as a plain JSON mapping.
#[derive(Debug, Clone)]
pub struct JsonModel {
    type_name: String,
    attributes: Map<String, Value>,
}

impl JsonModel {
    pub fn new(type_name: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            type_name: type_name.into(),
            attributes,
        }
    }
}

impl SdkModel for JsonModel {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn to_dict(&self) -> Result<Value, SdkError> {
        Ok(Value::Object(self.attributes.clone()))
    }

    fn fields(&self) -> Option<Vec<(String, SdkValue)>> {
        Some(
            self.attributes
                .iter()
                .map(|(k, v)| (k.clone(), SdkValue::from_json(v)))
                .collect(),
        )
    }
}

/// A foreign value with nothing but a string form
#[derive(Clone)]
pub struct Opaque(Arc<dyn fmt::Display + Send + Sync>);

impl Opaque {
    pub fn new(value: impl fmt::Display + Send + Sync + 'static) -> Self {
        Opaque(Arc::new(value))
    }
}

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.0)
    }
}

/// Argument or response payload of an SDK call
#[derive(Debug, Clone)]
pub enum SdkValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<SdkValue>),
    Tuple(Vec<SdkValue>),
    Map(BTreeMap<String, SdkValue>),
    Model(Arc<dyn SdkModel>),
    Opaque(Opaque),
}

impl SdkValue {
    /// Convert a JSON value without any model construction
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => SdkValue::Null,
            Value::Bool(b) => SdkValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SdkValue::Int(i),
                None => n
                    .as_f64()
                    .map(SdkValue::Float)
                    .unwrap_or_else(|| SdkValue::Str(n.to_string())),
            },
            Value::String(s) => SdkValue::Str(s.clone()),
            Value::Array(items) => SdkValue::List(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => SdkValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    pub fn model(model: impl SdkModel + 'static) -> Self {
        SdkValue::Model(Arc::new(model))
    }

    pub fn opaque(value: impl fmt::Display + Send + Sync + 'static) -> Self {
        SdkValue::Opaque(Opaque::new(value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SdkValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SdkValue::Int(i) => Some(*i),
            SdkValue::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&Arc<dyn SdkModel>> {
        match self {
            SdkValue::Model(m) => Some(m),
            _ => None,
        }
    }
}

impl From<&str> for SdkValue {
    fn from(s: &str) -> Self {
        SdkValue::Str(s.to_string())
    }
}

impl From<String> for SdkValue {
    fn from(s: String) -> Self {
        SdkValue::Str(s)
    }
}

impl From<i64> for SdkValue {
    fn from(i: i64) -> Self {
        SdkValue::Int(i)
    }
}

impl From<Vec<SdkValue>> for SdkValue {
    fn from(items: Vec<SdkValue>) -> Self {
        SdkValue::List(items)
    }
}
