//! JSON-safe rendering of arbitrary SDK values.

use crate::sdk::{SdkModel, SdkValue};
use serde_json::{Map, Number, Value};
use tracing::debug;

/// Convert any SDK value into JSON. Never fails: whatever JSON cannot
/// represent natively becomes its string form.
pub fn serialize(value: &SdkValue) -> Value {
    match value {
        SdkValue::Null => Value::Null,
        SdkValue::Bool(b) => Value::Bool(*b),
        SdkValue::Int(i) => Value::Number((*i).into()),
        SdkValue::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        SdkValue::Str(s) => Value::String(s.clone()),
        SdkValue::List(items) | SdkValue::Tuple(items) => {
            Value::Array(items.iter().map(serialize).collect())
        }
        SdkValue::Map(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), serialize(v)))
                .collect(),
        ),
        SdkValue::Model(model) => serialize_model(model.as_ref()),
        SdkValue::Opaque(opaque) => Value::String(opaque.to_string()),
    }
}

/// `to_dict`, then the public field view, then the string form
fn serialize_model(model: &dyn SdkModel) -> Value {
    match model.to_dict() {
        Ok(value) => return value,
        Err(e) => debug!(model = model.type_name(), error = %e, "to_dict failed, using fields"),
    }

    if let Some(fields) = model.fields() {
        let map: Map<String, Value> = fields
            .iter()
            .filter(|(name, _)| !name.starts_with('_'))
            .map(|(name, value)| (name.clone(), serialize(value)))
            .collect();
        return Value::Object(map);
    }

    Value::String(model.describe())
}
