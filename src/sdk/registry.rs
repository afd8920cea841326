//! Explicit registry of client classes and model namespaces.
//!
//! Client classes are keyed by fully-qualified name
//! (`oci.core.VirtualNetworkClient`); model namespaces by package path
//! (`oci.core.models`). A client's models live in the sibling `.models`
//! namespace of its package.

use super::client::Client;
use super::factory::ClientContext;
use super::value::{SdkModel, SerdeModel};
use crate::error::SdkError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a model instance from keyword fields
pub type ModelConstructor =
    Arc<dyn Fn(&Map<String, Value>) -> Result<Arc<dyn SdkModel>, SdkError> + Send + Sync>;

/// Builds a client instance
pub type ClientConstructor = Arc<dyn Fn(&ClientContext) -> Result<Client, SdkError> + Send + Sync>;

/// A constructible model class
#[derive(Clone)]
pub struct ModelClass {
    name: String,
    constructor: ModelConstructor,
}

impl ModelClass {
    pub fn new<F>(name: &str, constructor: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Result<Arc<dyn SdkModel>, SdkError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            constructor: Arc::new(constructor),
        }
    }

    /// Model class backed by a serde type; unknown or ill-typed fields fail construction
    /// when `T` is declared with `#[serde(deny_unknown_fields)]`.
    pub fn typed<T>(name: &str) -> Self
    where
        T: DeserializeOwned + Serialize + fmt::Debug + Send + Sync + 'static,
    {
        let type_name = name.to_string();
        Self::new(name, move |fields| {
            let inner: T = serde_json::from_value(Value::Object(fields.clone()))
                .map_err(|e| SdkError::model(&type_name, e.to_string()))?;
            Ok(Arc::new(SerdeModel::new(type_name.clone(), inner)) as Arc<dyn SdkModel>)
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn construct(&self, fields: &Map<String, Value>) -> Result<Arc<dyn SdkModel>, SdkError> {
        (self.constructor)(fields)
    }
}

impl fmt::Debug for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelClass").field(&self.name).finish()
    }
}

/// The model classes of one SDK package
#[derive(Debug, Clone, Default)]
pub struct ModelNamespace {
    path: String,
    classes: HashMap<String, ModelClass>,
}

impl ModelNamespace {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            classes: HashMap::new(),
        }
    }

    pub fn with_class(mut self, class: ModelClass) -> Self {
        self.classes.insert(class.name.clone(), class);
        self
    }

    pub fn resolve_model_class(&self, class_name: &str) -> Option<&ModelClass> {
        self.classes.get(class_name)
    }
}

/// A registered client class
#[derive(Clone)]
pub struct ClientClass {
    fqn: String,
    constructor: ClientConstructor,
}

impl ClientClass {
    pub fn fqn(&self) -> &str {
        &self.fqn
    }

    pub fn instantiate(&self, ctx: &ClientContext) -> Result<Client, SdkError> {
        (self.constructor)(ctx)
    }
}

impl fmt::Debug for ClientClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClientClass").field(&self.fqn).finish()
    }
}

/// Immutable lookup tables for clients and models
#[derive(Debug, Default)]
pub struct SdkRegistry {
    clients: HashMap<String, ClientClass>,
    namespaces: HashMap<String, ModelNamespace>,
}

impl SdkRegistry {
    pub fn builder() -> SdkRegistryBuilder {
        SdkRegistryBuilder::default()
    }

    pub fn client_class(&self, fqn: &str) -> Option<&ClientClass> {
        self.clients.get(fqn)
    }

    /// Sibling `models` namespace of a client. Soft-fails to `None`.
    pub fn import_models_namespace(&self, client_fqn: &str) -> Option<&ModelNamespace> {
        let path = models_path_for(client_fqn)?;
        self.namespaces.get(&path)
    }
}

/// Derive `<package>.models` from a client's fully-qualified name.
///
/// Both `oci.core.VirtualNetworkClient` and
/// `oci.core.virtual_network_client.VirtualNetworkClient` map to `oci.core.models`.
pub fn models_path_for(client_fqn: &str) -> Option<String> {
    let (mut package, _class) = client_fqn.rsplit_once('.')?;
    if let Some((parent, module)) = package.rsplit_once('.') {
        if module.ends_with("_client") {
            package = parent;
        }
    }
    if package.is_empty() {
        return None;
    }
    Some(format!("{}.models", package))
}

/// Builder for `SdkRegistry`
#[derive(Default)]
pub struct SdkRegistryBuilder {
    clients: HashMap<String, ClientClass>,
    namespaces: HashMap<String, ModelNamespace>,
}

impl SdkRegistryBuilder {
    pub fn client<F>(mut self, fqn: &str, constructor: F) -> Self
    where
        F: Fn(&ClientContext) -> Result<Client, SdkError> + Send + Sync + 'static,
    {
        self.clients.insert(
            fqn.to_string(),
            ClientClass {
                fqn: fqn.to_string(),
                constructor: Arc::new(constructor),
            },
        );
        self
    }

    pub fn models(mut self, namespace: ModelNamespace) -> Self {
        self.namespaces.insert(namespace.path.clone(), namespace);
        self
    }

    pub fn build(self) -> SdkRegistry {
        SdkRegistry {
            clients: self.clients,
            namespaces: self.namespaces,
        }
    }
}
