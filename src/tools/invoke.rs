//! `invoke_cloud_operation`: the generic tool that reaches any registered
//! client operation.

use super::ToolDef;
use crate::dispatch::{Dispatcher, InvocationOutcome, InvocationRequest};
use serde_json::{json, Value};
use std::time::Instant;

pub const TOOL_NAME: &str = "invoke_cloud_operation";

/// Input schema of the tool
pub fn input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "client": {
                "type": "string",
                "description": "Fully-qualified SDK client class, e.g. oci.core.VirtualNetworkClient"
            },
            "operation": {
                "type": "string",
                "description": "Client method name in snake_case, e.g. list_vcns"
            },
            "params": {
                "type": "object",
                "description": "Keyword arguments for the operation. Nested objects are converted to SDK models when their key names a model (create_vcn_details -> CreateVcnDetails). Pass limit to cap paginated results.",
                "additionalProperties": true
            }
        },
        "required": ["client", "operation"]
    })
}

pub fn definition(server: &str) -> ToolDef {
    ToolDef {
        server: server.to_string(),
        name: TOOL_NAME.to_string(),
        description: "Invoke any cloud SDK client operation by name. Paginated list operations are drained automatically.".to_string(),
        input_schema: input_schema(),
    }
}

/// Execute a tool call and format the standard tool response
pub fn execute(dispatcher: &Dispatcher, args: Value) -> Value {
    let request: InvocationRequest = match serde_json::from_value(args.clone()) {
        Ok(request) => request,
        Err(e) => {
            return json!({
                "client": args.get("client").cloned().unwrap_or(Value::Null),
                "operation": args.get("operation").cloned().unwrap_or(Value::Null),
                "ok": false,
                "error": {
                    "code": "invalid_arguments",
                    "message": e.to_string()
                }
            })
        }
    };

    let start = Instant::now();
    let outcome = dispatcher.invoke(&request);
    format_result(&request, &outcome, start.elapsed().as_millis() as u64)
}

fn format_result(request: &InvocationRequest, outcome: &InvocationOutcome, duration_ms: u64) -> Value {
    match outcome {
        InvocationOutcome::Data {
            data,
            opc_request_id,
        } => json!({
            "client": request.client,
            "operation": request.operation,
            "ok": true,
            "data": data,
            "opc_request_id": opc_request_id,
            "duration_ms": duration_ms
        }),
        InvocationOutcome::Error { error } => json!({
            "client": request.client,
            "operation": request.operation,
            "ok": false,
            "error": {
                "code": "invocation_failed",
                "message": error
            }
        }),
    }
}
