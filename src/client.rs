//! The client constructor contract and the stock RPC client.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::Span;
use url::{Host, Url};

use crate::{CallContext, ClientSettings, DefaultTransportHandler, TransportHandler};

/// Port assumed when the address does not carry one.
pub const DEFAULT_PORT: u16 = 2113;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("Invalid address {address:?}: {source}")]
    MalformedAddress {
        address: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress {
        address: String,
        reason: &'static str,
    },
}

/// A client that can be built from one [`ClientSettings`].
///
/// This is what the registrar calls on first resolution. Construction errors propagate
/// to whoever triggered that resolution.
pub trait FromSettings: Sized + Send + Sync + 'static {
    fn from_settings(settings: ClientSettings) -> Result<Self, ClientError>;
}

/// Scheme, host and port of the remote node.
///
/// Userinfo, path and query of the address are accepted and not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn parse(address: &str) -> Result<Self, ClientError> {
        let url = Url::parse(address).map_err(|source| ClientError::MalformedAddress {
            address: address.to_string(),
            source,
        })?;

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => {
                return Err(ClientError::InvalidAddress {
                    address: address.to_string(),
                    reason: "missing host",
                })
            }
        };

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            port: url.port().unwrap_or(DEFAULT_PORT),
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}", self.scheme, self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}

/// The stock client.
///
/// Owns its settings; after construction they can only be read.
pub struct RpcClient {
    settings: ClientSettings,
    endpoint: Endpoint,
    transport: Arc<dyn TransportHandler>,
    logger: Span,
}

impl RpcClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let endpoint = Endpoint::parse(&settings.connectivity.address)?;

        let transport = match settings.create_transport_handler.as_ref() {
            Some(create) => create(),
            None => Arc::new(DefaultTransportHandler),
        };

        let logger = settings
            .logger_factory
            .as_ref()
            .map(|factory| factory.create_logger(std::any::type_name::<Self>()))
            .unwrap_or_else(Span::none);

        logger.in_scope(|| {
            tracing::debug!(
                %endpoint,
                transport = transport.name(),
                interceptors = settings.interceptors.as_ref().map_or(0, Vec::len),
                "rpc client created"
            );
        });

        Ok(Self {
            settings,
            endpoint,
            transport,
            logger,
        })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &dyn TransportHandler {
        self.transport.as_ref()
    }

    /// Build the context for an outgoing call.
    ///
    /// The default deadline and connection name are stamped first, then every interceptor
    /// runs in settings order.
    pub fn prepare_call(&self, method: &str) -> CallContext {
        let _enter = self.logger.enter();

        let mut call = CallContext::new(method);
        call.set_deadline(self.settings.default_deadline);
        if let Some(name) = self.settings.connection_name.as_deref() {
            call.add_metadata("connection-name", name);
        }
        for interceptor in self.settings.interceptors.iter().flatten() {
            interceptor.intercept(&mut call);
        }

        tracing::trace!(method, endpoint = %self.endpoint, "prepared call");
        call
    }
}

impl FromSettings for RpcClient {
    fn from_settings(settings: ClientSettings) -> Result<Self, ClientError> {
        Self::new(settings)
    }
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient")
            .field("endpoint", &self.endpoint)
            .field("transport", &self.transport.name())
            .field("settings", &self.settings)
            .finish()
    }
}
