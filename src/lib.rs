//! Generic invocation engine for cloud-SDK backed MCP tool servers.
//!
//! The dispatcher resolves a client and operation by name, coerces loose JSON
//! parameters into SDK payloads, drains paginated operations and serializes
//! whatever comes back into JSON. The classifier is an offline companion that
//! buckets SDK client methods into list/destructive/other.

pub mod classifier;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod naming;
pub mod policy;
pub mod sdk;
pub mod serialize;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{Dispatcher, InvocationOutcome, InvocationRequest};
pub use error::{DispatchError, SdkError};
pub use serialize::serialize;
