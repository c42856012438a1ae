use std::fmt;
use std::sync::Arc;

/// Carries calls from a client to the remote endpoint.
///
/// The wire protocol lives behind this trait; the registry only decides which handler a
/// client is built with.
pub trait TransportHandler: Send + Sync {
    /// Short name identifying the handler in logs.
    fn name(&self) -> &str;
}

/// Produces the transport handler for a client. Invoked once per client construction.
pub type TransportHandlerFactory = Arc<dyn Fn() -> Arc<dyn TransportHandler> + Send + Sync>;

/// Handler used when the settings carry no custom factory.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTransportHandler;

impl TransportHandler for DefaultTransportHandler {
    fn name(&self) -> &str {
        "default"
    }
}

impl fmt::Debug for dyn TransportHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransportHandler({})", self.name())
    }
}

/// Wrap a closure as a [`TransportHandlerFactory`].
pub fn transport_factory<H, F>(factory: F) -> TransportHandlerFactory
where
    H: TransportHandler + 'static,
    F: Fn() -> H + Send + Sync + 'static,
{
    Arc::new(move || Arc::new(factory()) as Arc<dyn TransportHandler>)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl TransportHandler for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_default_handler_name() {
        assert_eq!(DefaultTransportHandler.name(), "default");
    }

    #[test]
    fn test_transport_factory_builds_fresh_handlers() {
        let factory = transport_factory(|| Named("h2"));
        let a = factory();
        let b = factory();
        assert_eq!(a.name(), "h2");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(format!("{a:?}"), "TransportHandler(h2)");
    }
}
