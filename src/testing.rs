//! Fake `oci.core` SDK used by unit tests.

use crate::error::SdkError;
use crate::sdk::{
    CallArgs, Client, JsonModel, ModelClass, ModelNamespace, Operation, SdkModel, SdkRegistry,
    SdkResponse, SdkValue, Signature,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};

pub const VCN_CLIENT: &str = "oci.core.VirtualNetworkClient";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateVcnDetails {
    pub cidr_block: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compartment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// What a fake operation saw when its handler ran
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub operation: String,
    pub keys: Vec<String>,
    pub model_types: Vec<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<RecordedCall>>>);

impl CallLog {
    fn record(&self, operation: &str, args: &CallArgs) {
        let call = RecordedCall {
            operation: operation.to_string(),
            keys: args.keys().cloned().collect(),
            model_types: args
                .values()
                .filter_map(|v| v.as_model().map(|m| m.type_name().to_string()))
                .collect(),
            page: args.get("page").and_then(SdkValue::as_str).map(String::from),
        };
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.0.lock().unwrap().clone()
    }
}

fn vcn(fields: Value) -> SdkValue {
    let attrs: Map<String, Value> = fields.as_object().cloned().unwrap_or_default();
    SdkValue::model(JsonModel::new("Vcn", attrs))
}

fn virtual_network_client(log: &CallLog) -> Client {
    let create_log = log.clone();
    let create_vcn = Operation::new("create_vcn", move |args| {
        create_log.record("create_vcn", args);
        let details = args
            .get("create_vcn_details")
            .and_then(SdkValue::as_model)
            .ok_or_else(|| SdkError::MissingArgument {
                operation: "create_vcn".into(),
                argument: "create_vcn_details".into(),
            })?;
        let mut body = details.to_dict()?;
        body["id"] = json!("ocid1.vcn.oc1..created");
        body["lifecycle_state"] = json!("PROVISIONING");
        Ok(SdkResponse::new(vcn(body)).with_header("opc-request-id", "create-req"))
    })
    .with_signature(Signature::new(["create_vcn_details", "opc_retry_token"]))
    .with_doc("Creates a new virtual cloud network (VCN).");

    let list_log = log.clone();
    let list_vcns = Operation::new("list_vcns", move |args| {
        list_log.record("list_vcns", args);
        match args.get("page").and_then(SdkValue::as_str) {
            None => Ok(SdkResponse::new(SdkValue::List(vec![
                vcn(json!({"id": "m1"})),
                vcn(json!({"id": "m2"})),
            ]))
            .with_header("opc-request-id", "list-req-1")
            .with_next_page("np1")),
            Some("np1") => Ok(SdkResponse::new(SdkValue::List(vec![vcn(json!({"id": "m3"}))]))
                .with_header("opc-request-id", "list-req-2")),
            Some(other) => Err(SdkError::Other(format!("unknown page {}", other))),
        }
    })
    .with_signature(Signature::new(["compartment_id", "limit", "page", "display_name"]));

    let get_log = log.clone();
    let get_vcn = Operation::new("get_vcn", move |args| {
        get_log.record("get_vcn", args);
        match args.get("vcn_id").and_then(SdkValue::as_str) {
            Some("missing") => Err(SdkError::Service {
                status: 404,
                code: "NotAuthorizedOrNotFound".into(),
                message: "Authorization failed or requested resource not found.".into(),
                request_id: Some("get-req".into()),
            }),
            Some(id) => Ok(SdkResponse::new(vcn(json!({"id": id})))),
            None => Err(SdkError::MissingArgument {
                operation: "get_vcn".into(),
                argument: "vcn_id".into(),
            }),
        }
    })
    .with_signature(Signature::new(["vcn_id"]));

    let delete_log = log.clone();
    let delete_vcn = Operation::new("delete_vcn", move |args| {
        delete_log.record("delete_vcn", args);
        Ok(SdkResponse::new(SdkValue::Null))
    })
    .with_signature(Signature::new(["vcn_id", "if_match"]));

    // No signature: only the pagination allowlist knows this one pages
    let search_log = log.clone();
    let search_resources = Operation::new("search_resources", move |args| {
        search_log.record("search_resources", args);
        Ok(SdkResponse::new(SdkValue::List(vec![SdkValue::from("r")])).with_next_page("t1"))
    });

    Client::new(VCN_CLIENT)
        .with_operation(create_vcn)
        .with_operation(list_vcns)
        .with_operation(get_vcn)
        .with_operation(delete_vcn)
        .with_operation(search_resources)
        .with_attribute("base_client", SdkValue::opaque("<oci.base_client.BaseClient>"))
}

/// Registry with `oci.core.VirtualNetworkClient` and `oci.core.models`
pub fn registry(log: &CallLog) -> Arc<SdkRegistry> {
    let log = log.clone();
    Arc::new(
        SdkRegistry::builder()
            .client(VCN_CLIENT, move |_ctx| Ok(virtual_network_client(&log)))
            .models(
                ModelNamespace::new("oci.core.models")
                    .with_class(ModelClass::typed::<CreateVcnDetails>("CreateVcnDetails")),
            )
            .build(),
    )
}
