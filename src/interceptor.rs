use std::time::Duration;

/// An outgoing call as seen by interceptors, before it reaches the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    method: String,
    deadline: Option<Duration>,
    metadata: Vec<(String, String)>,
}

impl CallContext {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            deadline: None,
            metadata: Vec::new(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub fn set_deadline(&mut self, deadline: Option<Duration>) {
        self.deadline = deadline;
    }

    /// Append a metadata entry. Keys are lowercased; repeated keys are kept.
    pub fn add_metadata(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.metadata
            .push((key.as_ref().to_ascii_lowercase(), value.into()));
    }

    /// Last value recorded for `key`.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        let key = key.to_ascii_lowercase();
        self.metadata
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn metadata_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.metadata.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Observes or modifies calls on their way out of a client.
///
/// Interceptors run in the order they appear in the client settings.
pub trait Interceptor: Send + Sync {
    fn intercept(&self, call: &mut CallContext);
}

impl<F> Interceptor for F
where
    F: Fn(&mut CallContext) + Send + Sync,
{
    fn intercept(&self, call: &mut CallContext) {
        self(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_last_value_wins() {
        let mut call = CallContext::new("users.Create");
        call.add_metadata("X-Trace", "a");
        call.add_metadata("x-trace", "b");

        assert_eq!(call.metadata("X-TRACE"), Some("b"));
        assert_eq!(call.metadata_entries().count(), 2);
        assert_eq!(call.metadata("missing"), None);
    }

    #[test]
    fn test_closure_interceptor() {
        let stamp = |call: &mut CallContext| call.add_metadata("stamp", "1");
        let mut call = CallContext::new("users.List");
        stamp.intercept(&mut call);
        assert_eq!(call.metadata("stamp"), Some("1"));
        assert_eq!(call.method(), "users.List");
    }
}
