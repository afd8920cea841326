//! Error types for SDK calls and dispatch.
//!
//! `DispatchError`'s `Display` output is the exact text returned to the agent
//! in the `{"error": ...}` payload, so keep messages short and name the
//! operation/client/keyword involved.

use thiserror::Error;

/// Errors raised by SDK clients, operations and model constructors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SdkError {
    /// Signature mismatch: the operation does not accept this keyword
    #[error("{operation}() got an unexpected keyword argument '{keyword}'")]
    UnexpectedKeyword { operation: String, keyword: String },

    #[error("{operation}() missing required argument '{argument}'")]
    MissingArgument { operation: String, argument: String },

    #[error("cannot construct {model}: {reason}")]
    ModelConstruction { model: String, reason: String },

    /// Error response returned by the cloud service
    #[error("service error {status} ({code}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
        request_id: Option<String>,
    },

    #[error("cannot construct client {client}: {reason}")]
    ClientConstruction { client: String, reason: String },

    #[error("{0}")]
    Other(String),
}

impl SdkError {
    pub fn unexpected_keyword(operation: &str, keyword: &str) -> Self {
        SdkError::UnexpectedKeyword {
            operation: operation.to_string(),
            keyword: keyword.to_string(),
        }
    }

    pub fn model(model: &str, reason: impl Into<String>) -> Self {
        SdkError::ModelConstruction {
            model: model.to_string(),
            reason: reason.into(),
        }
    }

    /// The offending keyword if this is a signature mismatch
    pub fn unexpected_keyword_name(&self) -> Option<&str> {
        match self {
            SdkError::UnexpectedKeyword { keyword, .. } => Some(keyword),
            _ => None,
        }
    }
}

/// Errors surfaced at the invocation boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("{client} is not a known client")]
    UnknownClient { client: String },

    #[error("{operation} not found on {client}")]
    OperationNotFound { operation: String, client: String },

    #[error("{operation} is not callable")]
    NotCallable { operation: String },

    #[error("{operation} is denied by policy rule '{rule}'")]
    Denied { operation: String, rule: String },

    #[error(transparent)]
    Sdk(#[from] SdkError),
}
