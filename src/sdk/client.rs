//! Client instances and their named operations.
//!
//! A `Client` is a table of attributes keyed by name. Operations are the
//! callable ones; everything else (`base_client`, `retry_strategy`, ...) is a
//! plain value that exists but cannot be invoked.

use super::value::SdkValue;
use crate::error::SdkError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Keyword arguments of one operation call
pub type CallArgs = BTreeMap<String, SdkValue>;

/// Handler behind an operation name
pub type Handler = Arc<dyn Fn(&CallArgs) -> Result<SdkResponse, SdkError> + Send + Sync>;

/// Introspectable parameter list of an operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<String>,
    accepts_kwargs: bool,
}

impl Signature {
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            accepts_kwargs: false,
        }
    }

    /// Accept arbitrary extra keywords (`**kwargs`)
    pub fn with_kwargs(mut self) -> Self {
        self.accepts_kwargs = true;
        self
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p == name)
    }

    pub fn accepts(&self, name: &str) -> bool {
        self.accepts_kwargs || self.has_param(name)
    }
}

/// Response envelope of one SDK call
#[derive(Debug, Clone)]
pub struct SdkResponse {
    pub data: SdkValue,
    pub headers: BTreeMap<String, String>,
    pub has_next_page: bool,
    pub next_page: Option<String>,
}

impl SdkResponse {
    pub fn new(data: SdkValue) -> Self {
        Self {
            data,
            headers: BTreeMap::new(),
            has_next_page: false,
            next_page: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn with_next_page(mut self, token: &str) -> Self {
        self.has_next_page = true;
        self.next_page = Some(token.to_string());
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// A named, callable operation on a client
#[derive(Clone)]
pub struct Operation {
    name: String,
    signature: Option<Signature>,
    doc: Option<String>,
    handler: Handler,
}

impl Operation {
    pub fn new<F>(name: &str, handler: F) -> Self
    where
        F: Fn(&CallArgs) -> Result<SdkResponse, SdkError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            signature: None,
            doc: None,
            handler: Arc::new(handler),
        }
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` when the signature cannot be introspected
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Invoke with keyword arguments, rejecting keywords the signature does not accept
    pub fn call(&self, args: &CallArgs) -> Result<SdkResponse, SdkError> {
        if let Some(signature) = &self.signature {
            if let Some(unexpected) = args.keys().find(|k| !signature.accepts(k)) {
                return Err(SdkError::unexpected_keyword(&self.name, unexpected));
            }
        }
        (self.handler)(args)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// A client attribute
#[derive(Debug, Clone)]
pub enum Attribute {
    Operation(Operation),
    Value(SdkValue),
}

/// An instantiated SDK client
#[derive(Debug, Clone)]
pub struct Client {
    fqn: String,
    attributes: HashMap<String, Attribute>,
}

impl Client {
    pub fn new(fqn: &str) -> Self {
        Self {
            fqn: fqn.to_string(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.attributes
            .insert(operation.name.clone(), Attribute::Operation(operation));
        self
    }

    pub fn with_attribute(mut self, name: &str, value: SdkValue) -> Self {
        self.attributes.insert(name.to_string(), Attribute::Value(value));
        self
    }

    /// Class name without its package path
    pub fn class_name(&self) -> &str {
        class_name(&self.fqn)
    }

    /// Public attribute lookup; `_`-prefixed names are never exposed
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        if name.starts_with('_') {
            return None;
        }
        self.attributes.get(name)
    }
}

/// Last dotted segment of a fully-qualified name
pub fn class_name(fqn: &str) -> &str {
    fqn.rsplit('.').next().unwrap_or(fqn)
}
