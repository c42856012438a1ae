//! Registration of a shared client into a [`ServiceCollection`].
//!
//! Registration builds the settings right away: defaults first, then the caller's
//! configuration pass. Building the client itself is deferred to the first resolution
//! from the provider. At that point any collaborator the caller left unset is taken from
//! the container:
//!
//! - `logger_factory` from the optional `dyn LoggerFactory` service
//! - `interceptors` from every registered `dyn Interceptor` service
//!
//! Fields the caller did set are never replaced. The client is registered as a singleton
//! under "add if absent" semantics, so registering the same client type twice keeps the
//! first registration.
//!
//! # Examples
//!
//! ```rust
//! use rpc_client_registry::{
//!     ClientServiceCollectionExt, LoggerFactory, RpcClient, ServiceCollection, ServiceResolver,
//!     TracingLoggerFactory,
//! };
//! use std::sync::Arc;
//!
//! let mut services = ServiceCollection::new();
//! services
//!     .add_singleton::<dyn LoggerFactory>(Arc::new(TracingLoggerFactory))
//!     .add_rpc_client_at("grpc://node1:2113", None);
//!
//! let provider = services.build_provider();
//! let client = provider.get_required_service::<RpcClient>().unwrap();
//! assert_eq!(client.settings().connectivity.address, "grpc://node1:2113");
//! assert!(client.settings().logger_factory.is_some());
//! ```

use std::sync::Arc;

use thiserror::Error;

use crate::{
    BoxError, ClientSettings, FromSettings, Interceptor, LoggerFactory, RegistryError, RpcClient,
    ServiceCollection, ServiceProvider, ServiceResolver, TransportHandlerFactory,
};

#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error("Value cannot be null. (Parameter 'container')")]
    MissingContainer,

    /// The fallible configuration pass failed; nothing was registered.
    #[error("Client settings configuration failed: {0}")]
    Configure(#[source] BoxError),
}

/// Register a client of type `C` connecting to `address`.
///
/// `create_transport_handler` of `None` keeps the built-in transport.
///
/// # Errors
///
/// `MissingContainer` when `container` is `None`.
pub fn register_client_by_address<C: FromSettings>(
    container: Option<&mut ServiceCollection>,
    address: impl Into<String>,
    create_transport_handler: Option<TransportHandlerFactory>,
) -> Result<&mut ServiceCollection, RegistrarError> {
    register_client::<C, _>(
        container,
        Some(set_address(address.into(), create_transport_handler)),
    )
}

/// Register a client of type `C`, configured by `configure`.
///
/// `configure` runs once, before this function returns. `None` keeps all defaults.
///
/// # Errors
///
/// `MissingContainer` when `container` is `None`; `configure` is not called in that case.
pub fn register_client<C, F>(
    container: Option<&mut ServiceCollection>,
    configure: Option<F>,
) -> Result<&mut ServiceCollection, RegistrarError>
where
    C: FromSettings,
    F: FnOnce(&mut ClientSettings),
{
    let services = container.ok_or(RegistrarError::MissingContainer)?;
    register_configured::<C>(services, |settings| {
        if let Some(configure) = configure {
            configure(settings);
        }
    });
    Ok(services)
}

/// Like [`register_client`], with a configuration pass that can fail.
///
/// # Errors
///
/// - `MissingContainer` when `container` is `None`
/// - `Configure` carrying the callback's error; the container is left unchanged
pub fn try_register_client<C, F, E>(
    container: Option<&mut ServiceCollection>,
    configure: F,
) -> Result<&mut ServiceCollection, RegistrarError>
where
    C: FromSettings,
    F: FnOnce(&mut ClientSettings) -> Result<(), E>,
    E: Into<BoxError>,
{
    let services = container.ok_or(RegistrarError::MissingContainer)?;

    let mut settings = ClientSettings::default();
    configure(&mut settings).map_err(|e| RegistrarError::Configure(e.into()))?;

    add_client_factory::<C>(services, settings);
    Ok(services)
}

/// Registration methods on a collection that is known to exist.
pub trait ClientServiceCollectionExt {
    /// Register a client of type `C` configured by `configure`.
    fn add_client<C: FromSettings>(&mut self, configure: impl FnOnce(&mut ClientSettings)) -> &mut Self;

    /// Register a client of type `C` connecting to `address`.
    fn add_client_at<C: FromSettings>(
        &mut self,
        address: impl Into<String>,
        create_transport_handler: Option<TransportHandlerFactory>,
    ) -> &mut Self;

    fn add_rpc_client(&mut self, configure: impl FnOnce(&mut ClientSettings)) -> &mut Self {
        self.add_client::<RpcClient>(configure)
    }

    fn add_rpc_client_at(
        &mut self,
        address: impl Into<String>,
        create_transport_handler: Option<TransportHandlerFactory>,
    ) -> &mut Self {
        self.add_client_at::<RpcClient>(address, create_transport_handler)
    }
}

impl ClientServiceCollectionExt for ServiceCollection {
    fn add_client<C: FromSettings>(&mut self, configure: impl FnOnce(&mut ClientSettings)) -> &mut Self {
        register_configured::<C>(self, configure);
        self
    }

    fn add_client_at<C: FromSettings>(
        &mut self,
        address: impl Into<String>,
        create_transport_handler: Option<TransportHandlerFactory>,
    ) -> &mut Self {
        self.add_client::<C>(set_address(address.into(), create_transport_handler))
    }
}

/// Configuration pass used by the address-based entry points.
fn set_address(
    address: String,
    create_transport_handler: Option<TransportHandlerFactory>,
) -> impl FnOnce(&mut ClientSettings) {
    move |settings| {
        settings.connectivity.address = address;
        settings.create_transport_handler = create_transport_handler;
    }
}

/// Defaults, then `configure`, then the deferred factory. Shared by every infallible
/// entry point.
fn register_configured<C: FromSettings>(
    services: &mut ServiceCollection,
    configure: impl FnOnce(&mut ClientSettings),
) {
    let mut settings = ClientSettings::default();
    configure(&mut settings);
    add_client_factory::<C>(services, settings);
}

/// Register the deferred construction of `C` from `settings`.
///
/// The captured settings are never mutated: each construction attempt finalizes its own
/// copy and hands it to the client. The provider's singleton cell guarantees a successful
/// construction happens once.
fn add_client_factory<C: FromSettings>(services: &mut ServiceCollection, settings: ClientSettings) {
    let client = std::any::type_name::<C>();
    tracing::debug!(
        client,
        address = %settings.connectivity.address,
        "registering client"
    );

    let added = services.try_add_singleton_factory::<C, _>(move |provider| {
        let settings = finalize_settings(settings.clone(), provider)?;
        let instance = C::from_settings(settings)?;
        Ok(Arc::new(instance))
    });

    if !added {
        tracing::debug!(client, "client already registered, keeping existing registration");
    }
}

/// Fill collaborators the caller left unset from the container.
fn finalize_settings(
    mut settings: ClientSettings,
    provider: &ServiceProvider,
) -> Result<ClientSettings, RegistryError> {
    if settings.logger_factory.is_none() {
        settings.logger_factory = provider.get_service::<dyn LoggerFactory>()?;
    }
    if settings.interceptors.is_none() {
        settings.interceptors = Some(provider.get_services::<dyn Interceptor>()?);
    }
    Ok(settings)
}
