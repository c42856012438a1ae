use std::fmt;

/// How long a registered service lives once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// One instance per provider, built on first resolution.
    Singleton,
    /// A fresh instance on every resolution.
    Transient,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Singleton => write!(f, "singleton"),
            Lifetime::Transient => write!(f, "transient"),
        }
    }
}

/// Events emitted by the container during registration and resolution.
///
/// These events are passed to the tracing callback set via `set_trace_callback`
/// on either the collection or the provider.
///
/// # Examples
///
/// ```rust
/// use rpc_client_registry::{Lifetime, RegistryEvent};
///
/// let event = RegistryEvent::Register { type_name: "i32", lifetime: Lifetime::Singleton };
/// assert_eq!(event.to_string(), "register { type_name: i32, lifetime: singleton }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A registration was appended to the collection.
    Register {
        type_name: &'static str,
        lifetime: Lifetime,
    },

    /// A `try_add_*` call found an existing registration and did nothing.
    Skip { type_name: &'static str },

    /// A single service was requested.
    Resolve {
        type_name: &'static str,
        /// Whether any registration existed for the type
        found: bool,
    },

    /// All services of a type were requested.
    ResolveAll { type_name: &'static str, count: usize },

    /// A type existence check was performed.
    Contains { type_name: &'static str, found: bool },

    /// A factory is about to run.
    Construct { type_name: &'static str },
}

impl fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEvent::Register {
                type_name,
                lifetime,
            } => {
                write!(
                    f,
                    "register {{ type_name: {type_name}, lifetime: {lifetime} }}"
                )
            }
            RegistryEvent::Skip { type_name } => write!(f, "skip {{ type_name: {type_name} }}"),
            RegistryEvent::Resolve { type_name, found } => {
                write!(f, "resolve {{ type_name: {type_name}, found: {found} }}")
            }
            RegistryEvent::ResolveAll { type_name, count } => {
                write!(f, "resolve_all {{ type_name: {type_name}, count: {count} }}")
            }
            RegistryEvent::Contains { type_name, found } => {
                write!(f, "contains {{ type_name: {type_name}, found: {found} }}")
            }
            RegistryEvent::Construct { type_name } => {
                write!(f, "construct {{ type_name: {type_name} }}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_event_display() {
        let event = RegistryEvent::Register {
            type_name: "i32",
            lifetime: Lifetime::Transient,
        };
        assert_eq!(
            event.to_string(),
            "register { type_name: i32, lifetime: transient }"
        );

        let event = RegistryEvent::Skip { type_name: "Client" };
        assert_eq!(event.to_string(), "skip { type_name: Client }");

        let event = RegistryEvent::Resolve {
            type_name: "String",
            found: true,
        };
        assert_eq!(event.to_string(), "resolve { type_name: String, found: true }");

        let event = RegistryEvent::ResolveAll {
            type_name: "dyn Interceptor",
            count: 3,
        };
        assert_eq!(
            event.to_string(),
            "resolve_all { type_name: dyn Interceptor, count: 3 }"
        );

        let event = RegistryEvent::Contains {
            type_name: "u8",
            found: false,
        };
        assert_eq!(event.to_string(), "contains { type_name: u8, found: false }");

        let event = RegistryEvent::Construct { type_name: "u8" };
        assert_eq!(event.to_string(), "construct { type_name: u8 }");
    }

    #[test]
    fn test_registry_event_clone() {
        let event = RegistryEvent::Skip { type_name: "i32" };
        assert_eq!(event.clone(), event);
    }
}
