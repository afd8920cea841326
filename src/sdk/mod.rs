//! SDK surface consumed by the dispatcher: values, models, clients and the
//! registry that replaces runtime module lookup.

pub mod client;
pub mod factory;
pub mod registry;
pub mod value;

pub use client::{Attribute, CallArgs, Client, Operation, SdkResponse, Signature};
pub use factory::{AnonymousSigner, ClientContext, ClientFactory, RegistryClientFactory, RequestSigner};
pub use registry::{ClientClass, ModelClass, ModelNamespace, SdkRegistry, SdkRegistryBuilder};
pub use value::{JsonModel, Opaque, SdkModel, SdkValue, SerdeModel};
