//! Parameter coercion: loose JSON params to the keyword arguments an
//! operation actually accepts.
//!
//! Two things happen before the call:
//! - short `*_details`-style keys are renamed to the operation's canonical
//!   key (`vcn_details` -> `create_vcn_details` for `create_vcn`);
//! - JSON objects whose key names a model class in the client's model
//!   namespace are constructed as that model (`create_vcn_details` ->
//!   `CreateVcnDetails`).
//!
//! Both are best effort. The only recovery after the call is the single
//! alias retry in [`call_with_alias_retry`].

use crate::error::SdkError;
use crate::naming::{first_token, to_pascal_case};
use crate::sdk::{CallArgs, ModelNamespace, Operation, SdkRegistry, SdkValue};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Verbs whose operations take a `<verb>_<short>` details argument
const ALIAS_VERB_PREFIXES: &[&str] = &[
    "add", "attach", "bulk", "change", "create", "detach", "disable", "enable", "export",
    "import", "install", "launch", "remove", "update",
];

/// Arguments after coercion, plus what is needed for the alias retry
#[derive(Debug, Clone, Default)]
pub struct Coerced {
    pub args: CallArgs,
    /// Keys exactly as the caller supplied them
    pub original_keys: Vec<String>,
    /// short key -> canonical key, for every rename applied
    pub renames: BTreeMap<String, String>,
}

/// Canonical alias of a short key under the verb-prefix rule, if the
/// operation's verb takes details arguments
pub fn alias_candidate(operation_name: &str, short_key: &str) -> Option<String> {
    let verb = first_token(operation_name);
    if !ALIAS_VERB_PREFIXES.contains(&verb) {
        return None;
    }
    if short_key.starts_with(&format!("{}_", verb)) {
        return None;
    }
    Some(format!("{}_{}", verb, short_key))
}

/// Canonical key for `short_key` when the signature proves the rename is right
fn canonical_alias(operation: &Operation, short_key: &str) -> Option<String> {
    let signature = operation.signature()?;
    if signature.has_param(short_key) {
        return None;
    }
    let canonical = alias_candidate(operation.name(), short_key)?;
    signature.has_param(&canonical).then_some(canonical)
}

/// Rename aliased keys and construct models for object-valued params
pub fn coerce_params(
    operation: &Operation,
    raw_params: &Map<String, Value>,
    client_fqn: &str,
    registry: &SdkRegistry,
) -> Coerced {
    let namespace = registry.import_models_namespace(client_fqn);
    let mut coerced = Coerced {
        original_keys: raw_params.keys().cloned().collect(),
        ..Coerced::default()
    };

    for (key, value) in raw_params {
        let target = match canonical_alias(operation, key) {
            Some(canonical) if !raw_params.contains_key(&canonical) => {
                debug!(operation = operation.name(), from = %key, to = %canonical, "renaming parameter");
                coerced.renames.insert(key.clone(), canonical.clone());
                canonical
            }
            _ => key.clone(),
        };
        let value = coerce_value(&target, value, namespace);
        coerced.args.insert(target, value);
    }

    coerced
}

/// Construct a model when `key` names one, otherwise convert as-is
fn coerce_value(key: &str, value: &Value, namespace: Option<&ModelNamespace>) -> SdkValue {
    let (Value::Object(fields), Some(namespace)) = (value, namespace) else {
        return SdkValue::from_json(value);
    };

    let class_name = to_pascal_case(key);
    let Some(class) = namespace.resolve_model_class(&class_name) else {
        return SdkValue::from_json(value);
    };

    match class.construct(fields) {
        Ok(model) => SdkValue::Model(model),
        Err(e) => {
            debug!(model = %class_name, error = %e, "model construction failed, passing mapping through");
            SdkValue::from_json(value)
        }
    }
}

/// Run `invoke`, retrying once when it fails on a short key whose canonical
/// alias is also among the arguments. The retry drops the short key.
pub fn call_with_alias_retry<T, F>(
    operation: &Operation,
    coerced: &Coerced,
    mut invoke: F,
) -> Result<T, SdkError>
where
    F: FnMut(&CallArgs) -> Result<T, SdkError>,
{
    let err = match invoke(&coerced.args) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    let Some(keyword) = err.unexpected_keyword_name() else {
        return Err(err);
    };
    if !coerced.original_keys.iter().any(|k| k == keyword) {
        return Err(err);
    }
    let Some(canonical) = alias_candidate(operation.name(), keyword) else {
        return Err(err);
    };
    if !coerced.args.contains_key(&canonical) {
        return Err(err);
    }

    debug!(operation = operation.name(), dropped = %keyword, kept = %canonical, "retrying without short alias");
    let mut retry_args = coerced.args.clone();
    retry_args.remove(keyword);
    invoke(&retry_args)
}
