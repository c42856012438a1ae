//! # RPC Client Registry
//!
//! Registers one shared RPC client into a typed service container.
//!
//! Settings are composed when the client is registered: defaults first, then the
//! caller's configuration pass. The client itself is built lazily, on the first
//! resolution from the provider, and cross-cutting collaborators the caller left unset
//! (logger factory, interceptors) are resolved from the container at that moment.
//! Exactly one client is constructed per provider.
//!
//! ## Quick Start
//!
//! ```rust
//! use rpc_client_registry::{
//!     CallContext, ClientServiceCollectionExt, Interceptor, RpcClient, ServiceCollection,
//!     ServiceResolver,
//! };
//! use std::sync::Arc;
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton::<dyn Interceptor>(Arc::new(|call: &mut CallContext| {
//!     call.add_metadata("x-tenant", "acme");
//! }));
//! services.add_rpc_client(|settings| {
//!     settings.connectivity.address = "grpc://node1:2113".into();
//! });
//!
//! let provider = services.build_provider();
//! let client: Arc<RpcClient> = provider.get_required_service().unwrap();
//! let again: Arc<RpcClient> = provider.get_required_service().unwrap();
//! assert!(Arc::ptr_eq(&client, &again));
//!
//! let call = client.prepare_call("users.Create");
//! assert_eq!(call.metadata("x-tenant"), Some("acme"));
//! ```
//!
//! ## Main Items
//!
//! - [`ServiceCollection`] - registration table (build phase)
//! - [`ServiceProvider`] / [`ServiceResolver`] - resolution with lazy singletons
//! - [`ClientServiceCollectionExt`], [`register_client`], [`register_client_by_address`] -
//!   client registration
//! - [`ClientSettings`] - what a client is built from
//! - [`RpcClient`] - the stock client

mod client;
mod collection;
mod config;
mod interceptor;
mod logging;
mod provider;
mod registrar;
mod registry_error;
mod registry_event;
mod registry_trait;
mod settings;
mod transport;

pub use client::{ClientError, Endpoint, FromSettings, RpcClient, DEFAULT_PORT};
pub use collection::{ErasedService, ServiceCollection, TraceCallback};
pub use config::{ConfigError, SettingsLoader, DEFAULT_ENV_PREFIX};
pub use interceptor::{CallContext, Interceptor};
pub use logging::{LoggerFactory, TracingLoggerFactory};
pub use provider::ServiceProvider;
pub use registrar::{
    register_client, register_client_by_address, try_register_client, ClientServiceCollectionExt,
    RegistrarError,
};
pub use registry_error::{BoxError, RegistryError};
pub use registry_event::{Lifetime, RegistryEvent};
pub use registry_trait::{ServiceResolver, TraceSlot};
pub use settings::{ClientSettings, ConnectivitySettings, DEFAULT_ADDRESS};
pub use transport::{
    transport_factory, DefaultTransportHandler, TransportHandler, TransportHandlerFactory,
};
