use tracing::Span;

/// Source of loggers for clients.
///
/// A logger is a `tracing` span: events a client emits while the span is entered carry
/// the span's fields. Applications register one implementation in the container and every
/// client that was not given its own picks it up on construction.
pub trait LoggerFactory: Send + Sync {
    fn create_logger(&self, category: &str) -> Span;
}

/// Creates `info`-level spans named `rpc_client` with the category as a field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLoggerFactory;

impl LoggerFactory for TracingLoggerFactory {
    fn create_logger(&self, category: &str) -> Span {
        tracing::info_span!("rpc_client", category = %category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_without_subscriber_is_disabled() {
        // No subscriber is installed for unit tests, so the span is a no-op.
        let span = TracingLoggerFactory.create_logger("users");
        assert!(span.is_disabled());
    }
}
