//! Client settings.
//!
//! `ClientSettings` is a plain struct with public fields. It is filled in once, by defaults
//! and a caller-supplied configuration pass, and is then handed to a client by value.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::{Interceptor, LoggerFactory, TransportHandlerFactory};

/// Address used when none is configured.
pub const DEFAULT_ADDRESS: &str = "https://localhost:2113";

/// Where the client connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivitySettings {
    /// Remote endpoint, e.g. `grpc://node1:2113`. Validated when the client is built.
    pub address: String,
}

impl Default for ConnectivitySettings {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
        }
    }
}

/// Everything a client is constructed from.
///
/// `None` in `logger_factory` or `interceptors` means "not configured": when the client is
/// registered into a container, those fields are filled from the container on first
/// resolution. `Some(vec![])` is an explicit empty interceptor list and is kept as is.
#[derive(Clone, Default)]
pub struct ClientSettings {
    pub connectivity: ConnectivitySettings,
    /// Custom transport; `None` selects the built-in default handler.
    pub create_transport_handler: Option<TransportHandlerFactory>,
    pub logger_factory: Option<Arc<dyn LoggerFactory>>,
    pub interceptors: Option<Vec<Arc<dyn Interceptor>>>,
    /// Sent with every call as `connection-name` metadata.
    pub connection_name: Option<String>,
    /// Deadline applied to calls that don't set their own.
    pub default_deadline: Option<Duration>,
}

impl ClientSettings {
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            connectivity: ConnectivitySettings {
                address: address.into(),
            },
            ..Self::default()
        }
    }

    /// Append an interceptor, turning an unset list into an explicit one.
    pub fn add_interceptor(&mut self, interceptor: Arc<dyn Interceptor>) -> &mut Self {
        self.interceptors
            .get_or_insert_with(Vec::new)
            .push(interceptor);
        self
    }
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("connectivity", &self.connectivity)
            .field(
                "create_transport_handler",
                &self.create_transport_handler.is_some(),
            )
            .field("logger_factory", &self.logger_factory.is_some())
            .field("interceptors", &self.interceptors.as_ref().map(Vec::len))
            .field("connection_name", &self.connection_name)
            .field("default_deadline", &self.default_deadline)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CallContext;

    #[test]
    fn test_defaults_leave_collaborators_unset() {
        let settings = ClientSettings::default();
        assert_eq!(settings.connectivity.address, DEFAULT_ADDRESS);
        assert!(settings.create_transport_handler.is_none());
        assert!(settings.logger_factory.is_none());
        assert!(settings.interceptors.is_none());
        assert!(settings.connection_name.is_none());
        assert!(settings.default_deadline.is_none());
    }

    #[test]
    fn test_with_address() {
        let settings = ClientSettings::with_address("grpc://node1:2113");
        assert_eq!(settings.connectivity.address, "grpc://node1:2113");
    }

    #[test]
    fn test_add_interceptor_creates_list() {
        let mut settings = ClientSettings::default();
        settings
            .add_interceptor(Arc::new(|_: &mut CallContext| {}))
            .add_interceptor(Arc::new(|_: &mut CallContext| {}));
        assert_eq!(settings.interceptors.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_debug_hides_collaborators() {
        let settings = ClientSettings {
            interceptors: Some(Vec::new()),
            ..ClientSettings::default()
        };
        let rendered = format!("{settings:?}");
        assert!(rendered.contains("interceptors: Some(0)"));
        assert!(rendered.contains("logger_factory: false"));
    }
}
