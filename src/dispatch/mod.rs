//! Generic invocation entry point.
//!
//! ```text
//! {client, operation, params}
//!   -> client factory            (unknown client -> error)
//!   -> attribute lookup          (missing / not callable -> error)
//!   -> policy                    (denied -> error)
//!   -> coerce_params             (rename + model construction)
//!   -> call_with_alias_retry
//!        -> invoke_with_pagination
//!   -> serialize                 -> {"data": ...} | {"error": "..."}
//! ```

pub mod coerce;
pub mod pagination;

pub use coerce::{call_with_alias_retry, coerce_params, Coerced};
pub use pagination::{invoke_with_pagination, supports_pagination, PageCursor, PagedResult};

use crate::config::{Config, DispatchConfig};
use crate::error::DispatchError;
use crate::policy::{Decision, OperationPolicy};
use crate::sdk::{
    Attribute, ClientContext, ClientFactory, RegistryClientFactory, RequestSigner, SdkRegistry,
};
use crate::serialize::serialize;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Fully-qualified client class, e.g. `oci.core.VirtualNetworkClient`
    pub client: String,
    pub operation: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub params: Map<String, Value>,
}

/// `"params": null` means no parameters
fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl InvocationRequest {
    pub fn new(client: &str, operation: &str, params: Value) -> Self {
        Self {
            client: client.to_string(),
            operation: operation.to_string(),
            params: match params {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }
}

/// Tool-level result: always data or an error string, never a fault
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InvocationOutcome {
    Data {
        data: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        opc_request_id: Option<String>,
    },
    Error {
        error: String,
    },
}

impl InvocationOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, InvocationOutcome::Data { .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            InvocationOutcome::Data { data, .. } => Some(data),
            InvocationOutcome::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            InvocationOutcome::Error { error } => Some(error),
            InvocationOutcome::Data { .. } => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            InvocationOutcome::Data {
                data,
                opc_request_id,
            } => {
                let mut out = json!({ "data": data });
                if let Some(id) = opc_request_id {
                    out["opc_request_id"] = json!(id);
                }
                out
            }
            InvocationOutcome::Error { error } => json!({ "error": error }),
        }
    }
}

/// Stateless dispatcher; cheap to share across concurrent tool calls
pub struct Dispatcher {
    registry: Arc<SdkRegistry>,
    factory: Arc<dyn ClientFactory>,
    context: ClientContext,
    settings: DispatchConfig,
    policy: OperationPolicy,
}

impl Dispatcher {
    pub fn new(registry: Arc<SdkRegistry>) -> Self {
        Self {
            registry,
            factory: Arc::new(RegistryClientFactory),
            context: ClientContext::default(),
            settings: DispatchConfig::default(),
            policy: OperationPolicy::default(),
        }
    }

    /// Dispatcher wired from loaded configuration
    pub fn from_config(
        registry: Arc<SdkRegistry>,
        config: &Config,
        signer: Arc<dyn RequestSigner>,
    ) -> Self {
        Self::new(registry)
            .with_context(ClientContext::new(config.sdk.clone(), signer))
            .with_settings(config.dispatch.clone())
            .with_policy(OperationPolicy::from_config(&config.policy))
    }

    pub fn with_factory(mut self, factory: Arc<dyn ClientFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_context(mut self, context: ClientContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_settings(mut self, settings: DispatchConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_policy(mut self, policy: OperationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Invoke and shape the result for the tool layer
    pub fn invoke(&self, request: &InvocationRequest) -> InvocationOutcome {
        let start = Instant::now();
        match self.try_invoke(request) {
            Ok(result) => {
                info!(
                    client = %request.client,
                    operation = %request.operation,
                    pages = result.pages,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "invocation succeeded"
                );
                InvocationOutcome::Data {
                    data: serialize(&result.data),
                    opc_request_id: result.request_id,
                }
            }
            Err(e) => {
                warn!(
                    client = %request.client,
                    operation = %request.operation,
                    error = %e,
                    "invocation failed"
                );
                InvocationOutcome::Error {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Invoke, keeping the raw result and the typed error
    pub fn try_invoke(&self, request: &InvocationRequest) -> Result<PagedResult, DispatchError> {
        let class = self.registry.client_class(&request.client).ok_or_else(|| {
            DispatchError::UnknownClient {
                client: request.client.clone(),
            }
        })?;
        debug!(
            client = class.fqn(),
            profile = %self.context.config.profile,
            signer = self.context.signer.key_id(),
            "creating client"
        );
        let client = self.factory.create(class, &self.context)?;

        let operation = match client.attribute(&request.operation) {
            Some(Attribute::Operation(op)) => op,
            Some(Attribute::Value(_)) => {
                return Err(DispatchError::NotCallable {
                    operation: request.operation.clone(),
                })
            }
            None => {
                return Err(DispatchError::OperationNotFound {
                    operation: request.operation.clone(),
                    client: request.client.clone(),
                })
            }
        };

        if let (Decision::Deny, rule) = self.policy.resolve(client.class_name(), operation.name()) {
            return Err(DispatchError::Denied {
                operation: request.operation.clone(),
                rule: rule.unwrap_or_default(),
            });
        }

        let coerced = coerce_params(operation, &request.params, &request.client, &self.registry);
        let result = call_with_alias_retry(operation, &coerced, |args| {
            invoke_with_pagination(operation, args, &request.operation, &self.settings)
        })?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdkError;
    use crate::sdk::{Client, ClientClass};
    use crate::testing::{self, CallLog, VCN_CLIENT};

    fn dispatcher(log: &CallLog) -> Dispatcher {
        Dispatcher::new(testing::registry(log))
    }

    #[test]
    fn test_coercion_round_trip() {
        let log = CallLog::default();
        let outcome = dispatcher(&log).invoke(&InvocationRequest::new(
            VCN_CLIENT,
            "create_vcn",
            json!({"vcn_details": {"cidr_block": "10.0.0.0/16", "display_name": "my-vcn"}}),
        ));

        let data = outcome.data().expect("create_vcn should succeed");
        assert_eq!(data["cidr_block"], "10.0.0.0/16");
        assert_eq!(data["display_name"], "my-vcn");

        let calls = log.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].keys, vec!["create_vcn_details"]);
        assert_eq!(calls[0].model_types, vec!["CreateVcnDetails"]);
    }

    #[test]
    fn test_alias_retry_exactness() {
        let log = CallLog::default();
        let outcome = dispatcher(&log).invoke(&InvocationRequest::new(
            VCN_CLIENT,
            "create_vcn",
            json!({
                "vcn_details": {"cidr_block": "10.0.0.0/16"},
                "create_vcn_details": {"cidr_block": "10.0.0.0/16", "display_name": "kept"}
            }),
        ));

        assert!(outcome.is_ok(), "{:?}", outcome);
        assert_eq!(outcome.data().unwrap()["display_name"], "kept");
        let calls = log.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].keys, vec!["create_vcn_details"]);
    }

    #[test]
    fn test_non_alias_keyword_surfaces_error() {
        let log = CallLog::default();
        let outcome = dispatcher(&log).invoke(&InvocationRequest::new(
            VCN_CLIENT,
            "get_vcn",
            json!({"vcn_id": "ocid1.vcn.oc1..aaa", "verbose": true}),
        ));
        let error = outcome.error().expect("should fail");
        assert!(error.contains("unexpected keyword"), "{}", error);
        assert!(error.contains("verbose"));
        assert!(log.calls().is_empty());
    }

    #[test]
    fn test_pagination_drain() {
        let log = CallLog::default();
        let outcome = dispatcher(&log).invoke(&InvocationRequest::new(
            VCN_CLIENT,
            "list_vcns",
            json!({"compartment_id": "ocid1.compartment"}),
        ));

        assert_eq!(
            outcome.data().unwrap(),
            &json!([{"id": "m1"}, {"id": "m2"}, {"id": "m3"}])
        );
        let calls = log.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].page, None);
        assert_eq!(calls[1].page.as_deref(), Some("np1"));
        assert_eq!(
            outcome.to_json()["opc_request_id"],
            json!("list-req-2")
        );
    }

    #[test]
    fn test_pagination_limit_short_circuit() {
        let log = CallLog::default();
        let outcome = dispatcher(&log).invoke(&InvocationRequest::new(
            VCN_CLIENT,
            "list_vcns",
            json!({"compartment_id": "ocid1.compartment", "limit": 2}),
        ));

        assert_eq!(outcome.data().unwrap(), &json!([{"id": "m1"}, {"id": "m2"}]));
        assert_eq!(log.calls().len(), 1);
    }

    #[test]
    fn test_unchanged_token_stops_drain() {
        let log = CallLog::default();
        let outcome = dispatcher(&log).invoke(&InvocationRequest::new(
            VCN_CLIENT,
            "search_resources",
            json!({"query": "query all resources"}),
        ));
        assert_eq!(outcome.data().unwrap(), &json!(["r", "r"]));
        assert_eq!(log.calls().len(), 2);
    }

    #[test]
    fn test_missing_and_non_callable_operations() {
        let log = CallLog::default();
        let d = dispatcher(&log);

        let outcome = d.invoke(&InvocationRequest::new(VCN_CLIENT, "launch_rocket", json!({})));
        assert_eq!(
            outcome.error(),
            Some("launch_rocket not found on oci.core.VirtualNetworkClient")
        );

        let outcome = d.invoke(&InvocationRequest::new(VCN_CLIENT, "base_client", json!({})));
        assert_eq!(outcome.error(), Some("base_client is not callable"));

        let outcome = d.invoke(&InvocationRequest::new(VCN_CLIENT, "_call_api", json!({})));
        assert!(outcome.error().unwrap().contains("not found"));

        let outcome = d.invoke(&InvocationRequest::new("oci.nope.NopeClient", "get", json!({})));
        assert_eq!(outcome.error(), Some("oci.nope.NopeClient is not a known client"));
    }

    #[test]
    fn test_policy_denial() {
        let log = CallLog::default();
        let d = dispatcher(&log).with_policy(OperationPolicy::new().deny("*.delete_*"));
        let outcome = d.invoke(&InvocationRequest::new(
            VCN_CLIENT,
            "delete_vcn",
            json!({"vcn_id": "ocid1.vcn"}),
        ));
        assert_eq!(
            outcome.error(),
            Some("delete_vcn is denied by policy rule '*.delete_*'")
        );
        assert!(log.calls().is_empty());
    }

    #[test]
    fn test_service_error_becomes_payload() {
        let log = CallLog::default();
        let outcome = dispatcher(&log).invoke(&InvocationRequest::new(
            VCN_CLIENT,
            "get_vcn",
            json!({"vcn_id": "missing"}),
        ));
        let error = outcome.error().unwrap();
        assert!(error.contains("404"));
        assert!(error.contains("NotAuthorizedOrNotFound"));
        assert_eq!(outcome.to_json(), json!({ "error": error }));
    }

    struct FailingFactory;

    impl ClientFactory for FailingFactory {
        fn create(&self, class: &ClientClass, _ctx: &ClientContext) -> Result<Client, SdkError> {
            Err(SdkError::ClientConstruction {
                client: class.fqn().to_string(),
                reason: "missing key_file".into(),
            })
        }
    }

    #[test]
    fn test_client_factory_failure_is_structured() {
        let log = CallLog::default();
        let d = dispatcher(&log).with_factory(Arc::new(FailingFactory));
        let outcome = d.invoke(&InvocationRequest::new(VCN_CLIENT, "get_vcn", json!({})));
        assert!(outcome.error().unwrap().contains("missing key_file"));
    }

    #[test]
    fn test_from_config_applies_policy_and_settings() {
        let log = CallLog::default();
        let mut config = Config::default();
        config.policy.deny.push("VirtualNetworkClient.create_*".into());
        config.dispatch.max_pages = Some(1);
        let d = Dispatcher::from_config(
            testing::registry(&log),
            &config,
            Arc::new(crate::sdk::AnonymousSigner),
        );

        let outcome = d.invoke(&InvocationRequest::new(VCN_CLIENT, "create_vcn", json!({})));
        assert!(outcome.error().unwrap().contains("denied"));

        let outcome = d.invoke(&InvocationRequest::new(VCN_CLIENT, "list_vcns", json!({})));
        assert_eq!(outcome.data().unwrap(), &json!([{"id": "m1"}, {"id": "m2"}]));
    }
}
