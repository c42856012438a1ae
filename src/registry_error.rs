use thiserror::Error;

/// Boxed error returned by service factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while resolving services from a [`ServiceProvider`](crate::ServiceProvider).
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Service not found in registry: {type_name}")]
    ServiceNotFound { type_name: &'static str },

    #[error("Type mismatch in registry for type: {type_name}")]
    TypeMismatch { type_name: &'static str },

    #[error("Circular dependency detected while resolving: {type_name}")]
    CircularDependency { type_name: &'static str },

    /// The registered factory failed. `source` is the factory's error, untouched.
    #[error("Failed to construct {type_name}: {source}")]
    Construction {
        type_name: &'static str,
        #[source]
        source: BoxError,
    },
}

impl RegistryError {
    /// Returns the factory error when this is a construction failure.
    pub fn construction_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            RegistryError::Construction { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
