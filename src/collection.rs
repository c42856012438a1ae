//! Registration table for the build phase of the container.
//!
//! A [`ServiceCollection`] is an owned list of service descriptors. Registrations are
//! keyed by the service type (`TypeId`), may be unsized (`dyn Trait`), and keep their
//! insertion order so that multi-service resolution sees them in the order they were added.
//! Once registration is done, [`ServiceCollection::build_provider`] consumes the table and
//! yields a [`ServiceProvider`] that resolves from it.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::{BoxError, Lifetime, RegistryEvent, ServiceProvider};

/// A resolved service with its type erased. Always wraps an `Arc<T>` for the registered `T`.
pub type ErasedService = Arc<dyn Any + Send + Sync>;

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `RegistryEvent` every time the container is
/// interacted with. It must be thread-safe because providers are shared across threads.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

pub(crate) type ErasedFactory =
    Arc<dyn Fn(&ServiceProvider) -> Result<ErasedService, BoxError> + Send + Sync>;

pub(crate) enum Activation {
    Instance(ErasedService),
    Factory(ErasedFactory),
}

pub(crate) struct ServiceDescriptor {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) lifetime: Lifetime,
    pub(crate) activation: Activation,
}

pub(crate) fn erase<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> ErasedService {
    Arc::new(value)
}

/// Owned registration table.
///
/// # Examples
///
/// ```rust
/// use rpc_client_registry::{ServiceCollection, ServiceResolver};
/// use std::sync::Arc;
///
/// let mut services = ServiceCollection::new();
/// services
///     .add_singleton(Arc::new(42u32))
///     .add_singleton_factory(|_| Ok(Arc::new("built".to_string())));
///
/// let provider = services.build_provider();
/// let text: Arc<String> = provider.get_required_service().unwrap();
/// assert_eq!(text.as_str(), "built");
/// ```
#[derive(Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
    trace: Option<Arc<TraceCallback>>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already-built instance. Appends; earlier registrations stay visible
    /// to `get_services`.
    pub fn add_singleton<T: ?Sized + Send + Sync + 'static>(&mut self, value: Arc<T>) -> &mut Self {
        self.push::<T>(Lifetime::Singleton, Activation::Instance(erase(value)));
        self
    }

    /// Register a factory invoked once, on the first resolution of `T`.
    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        self.push::<T>(Lifetime::Singleton, Activation::Factory(erase_factory(factory)));
        self
    }

    /// Register a factory invoked on every resolution of `T`.
    pub fn add_transient_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        self.push::<T>(Lifetime::Transient, Activation::Factory(erase_factory(factory)));
        self
    }

    /// Register an instance unless `T` already has a registration.
    ///
    /// Returns `true` when the instance was added.
    pub fn try_add_singleton<T: ?Sized + Send + Sync + 'static>(&mut self, value: Arc<T>) -> bool {
        if self.skip_existing::<T>() {
            return false;
        }
        self.add_singleton(value);
        true
    }

    /// Register a singleton factory unless `T` already has a registration.
    ///
    /// Returns `true` when the factory was added. An existing registration is left
    /// untouched and no error is raised.
    pub fn try_add_singleton_factory<T, F>(&mut self, factory: F) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
    {
        if self.skip_existing::<T>() {
            return false;
        }
        self.add_singleton_factory(factory);
        true
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.count::<T>() > 0
    }

    /// Number of registrations for `T`.
    pub fn count<T: ?Sized + 'static>(&self) -> usize {
        let type_id = TypeId::of::<T>();
        self.descriptors
            .iter()
            .filter(|d| d.type_id == type_id)
            .count()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Set a tracing callback for registrations.
    ///
    /// The callback is handed over to the provider built from this collection.
    pub fn set_trace_callback(&mut self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        self.trace = Some(Arc::new(callback));
    }

    pub fn clear_trace_callback(&mut self) {
        self.trace = None;
    }

    /// Consume the collection and produce a provider resolving from it.
    pub fn build_provider(self) -> ServiceProvider {
        tracing::debug!(registrations = self.descriptors.len(), "building service provider");
        ServiceProvider::from_descriptors(self.descriptors, self.trace)
    }

    fn push<T: ?Sized + 'static>(&mut self, lifetime: Lifetime, activation: Activation) {
        let type_name = std::any::type_name::<T>();
        self.emit_event(&RegistryEvent::Register {
            type_name,
            lifetime,
        });
        tracing::debug!(service = type_name, %lifetime, "registered service");

        self.descriptors.push(ServiceDescriptor {
            type_id: TypeId::of::<T>(),
            type_name,
            lifetime,
            activation,
        });
    }

    fn skip_existing<T: ?Sized + 'static>(&self) -> bool {
        if !self.contains::<T>() {
            return false;
        }
        let type_name = std::any::type_name::<T>();
        self.emit_event(&RegistryEvent::Skip { type_name });
        tracing::debug!(service = type_name, "service already registered, skipping");
        true
    }

    fn emit_event(&self, event: &RegistryEvent) {
        if let Some(callback) = self.trace.as_ref() {
            callback(event);
        }
    }
}

impl fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCollection")
            .field(
                "services",
                &self
                    .descriptors
                    .iter()
                    .map(|d| d.type_name)
                    .collect::<Vec<_>>(),
            )
            .field("traced", &self.trace.is_some())
            .finish()
    }
}

fn erase_factory<T, F>(factory: F) -> ErasedFactory
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(&ServiceProvider) -> Result<Arc<T>, BoxError> + Send + Sync + 'static,
{
    Arc::new(move |provider: &ServiceProvider| factory(provider).map(erase::<T>))
}
