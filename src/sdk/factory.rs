//! Client construction boundary.
//!
//! Authentication is someone else's job: the dispatcher only hands the
//! configured `ClientContext` to a factory and gets a client back.

use super::client::Client;
use super::registry::ClientClass;
use crate::config::SdkConfig;
use crate::error::SdkError;
use std::fmt;
use std::sync::Arc;

/// Opaque request signer owned by the process entry point
pub trait RequestSigner: fmt::Debug + Send + Sync {
    /// Key identifier used for signing, for diagnostics only
    fn key_id(&self) -> &str;
}

/// Signer for tests and unauthenticated endpoints
#[derive(Debug, Default)]
pub struct AnonymousSigner;

impl RequestSigner for AnonymousSigner {
    fn key_id(&self) -> &str {
        "anonymous"
    }
}

/// Everything a client constructor may need, passed by reference to every call
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub config: SdkConfig,
    pub signer: Arc<dyn RequestSigner>,
}

impl ClientContext {
    pub fn new(config: SdkConfig, signer: Arc<dyn RequestSigner>) -> Self {
        Self { config, signer }
    }
}

impl Default for ClientContext {
    fn default() -> Self {
        Self::new(SdkConfig::default(), Arc::new(AnonymousSigner))
    }
}

/// Turns a resolved client class into a client instance
pub trait ClientFactory: Send + Sync {
    fn create(&self, class: &ClientClass, ctx: &ClientContext) -> Result<Client, SdkError>;
}

/// Factory that calls the constructor registered with the class
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryClientFactory;

impl ClientFactory for RegistryClientFactory {
    fn create(&self, class: &ClientClass, ctx: &ClientContext) -> Result<Client, SdkError> {
        class.instantiate(ctx)
    }
}
