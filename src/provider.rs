//! Resolve phase of the container.
//!
//! A [`ServiceProvider`] is built from a [`ServiceCollection`](crate::ServiceCollection)
//! and never changes its registrations afterwards, so lookups need no lock. Singleton
//! factories are guarded by a per-registration `OnceCell`: the factory runs at most once
//! to success for the life of the provider, and concurrent first resolvers block until
//! that single construction finishes. A failed construction leaves the cell empty, so the
//! next resolution tries again.
//!
//! Cycle detection is per thread. Resolving a type from inside its own factory on the same
//! thread fails with `CircularDependency`. A cycle split across threads is not detected:
//! if thread 1 builds singleton `A`, whose factory needs `B`, while thread 2 builds `B`,
//! whose factory needs `A`, each thread waits on the other's cell and neither returns.
//! Factories that depend on each other must not be first resolved concurrently.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;

use crate::collection::{Activation, ErasedFactory, ServiceDescriptor};
use crate::{
    ErasedService, Lifetime, RegistryError, RegistryEvent, ServiceResolver, TraceCallback,
    TraceSlot,
};

thread_local! {
    /// Services currently under construction on this thread, keyed by provider and type.
    static RESOLVING: RefCell<Vec<(usize, TypeId)>> = const { RefCell::new(Vec::new()) };
}

struct ServiceEntry {
    descriptor: ServiceDescriptor,
    instance: OnceCell<ErasedService>,
}

struct ProviderInner {
    entries: HashMap<TypeId, Vec<ServiceEntry>>,
    trace: TraceSlot,
}

/// Shared handle for resolving services. Cloning is cheap and clones share singletons.
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

impl ServiceProvider {
    pub(crate) fn from_descriptors(
        descriptors: Vec<ServiceDescriptor>,
        trace: Option<Arc<TraceCallback>>,
    ) -> Self {
        let mut entries: HashMap<TypeId, Vec<ServiceEntry>> = HashMap::new();
        for descriptor in descriptors {
            entries
                .entry(descriptor.type_id)
                .or_default()
                .push(ServiceEntry {
                    descriptor,
                    instance: OnceCell::new(),
                });
        }

        Self {
            inner: Arc::new(ProviderInner {
                entries,
                trace: Mutex::new(trace),
            }),
        }
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    fn activate(&self, entry: &ServiceEntry) -> Result<ErasedService, RegistryError> {
        let descriptor = &entry.descriptor;
        let factory = match &descriptor.activation {
            Activation::Instance(value) => return Ok(value.clone()),
            Activation::Factory(factory) => factory,
        };

        match descriptor.lifetime {
            Lifetime::Singleton => {
                if let Some(value) = entry.instance.get() {
                    return Ok(value.clone());
                }
                // Re-entering the cell from its own initializer would deadlock.
                let _guard = ResolutionGuard::enter(self.id(), descriptor)?;
                entry
                    .instance
                    .get_or_try_init(|| self.construct(descriptor, factory))
                    .cloned()
            }
            Lifetime::Transient => {
                let _guard = ResolutionGuard::enter(self.id(), descriptor)?;
                self.construct(descriptor, factory)
            }
        }
    }

    fn construct(
        &self,
        descriptor: &ServiceDescriptor,
        factory: &ErasedFactory,
    ) -> Result<ErasedService, RegistryError> {
        let type_name = descriptor.type_name;
        self.emit_event(&RegistryEvent::Construct { type_name });
        tracing::debug!(service = type_name, lifetime = %descriptor.lifetime, "constructing service");

        factory(self).map_err(|source| {
            tracing::warn!(service = type_name, error = %source, "service construction failed");
            RegistryError::Construction { type_name, source }
        })
    }

    fn entries(&self, type_id: TypeId) -> &[ServiceEntry] {
        self.inner
            .entries
            .get(&type_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl ServiceResolver for ServiceProvider {
    fn trace(&self) -> &TraceSlot {
        &self.inner.trace
    }

    fn resolve_last(
        &self,
        type_id: TypeId,
        type_name: &'static str,
    ) -> Result<Option<ErasedService>, RegistryError> {
        tracing::trace!(service = type_name, "resolving service");
        self.entries(type_id)
            .last()
            .map(|entry| self.activate(entry))
            .transpose()
    }

    fn resolve_all(
        &self,
        type_id: TypeId,
        type_name: &'static str,
    ) -> Result<Vec<ErasedService>, RegistryError> {
        tracing::trace!(service = type_name, "resolving all services");
        self.entries(type_id)
            .iter()
            .map(|entry| self.activate(entry))
            .collect()
    }

    fn is_registered(&self, type_id: TypeId) -> bool {
        !self.entries(type_id).is_empty()
    }
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constructed = self
            .inner
            .entries
            .values()
            .flatten()
            .filter(|e| e.instance.get().is_some())
            .count();
        f.debug_struct("ServiceProvider")
            .field("types", &self.inner.entries.len())
            .field("constructed_singletons", &constructed)
            .finish()
    }
}

/// Marks a service as under construction on the current thread until dropped.
struct ResolutionGuard {
    key: (usize, TypeId),
}

impl ResolutionGuard {
    fn enter(provider: usize, descriptor: &ServiceDescriptor) -> Result<Self, RegistryError> {
        let key = (provider, descriptor.type_id);
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&key) {
                tracing::warn!(service = descriptor.type_name, "circular dependency detected");
                return Err(RegistryError::CircularDependency {
                    type_name: descriptor.type_name,
                });
            }
            stack.push(key);
            Ok(Self { key })
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack.iter().rposition(|k| *k == self.key) {
                stack.remove(pos);
            }
        });
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
