//! Core trait defining service resolution.
//!
//! This module provides the `ServiceResolver` trait with default implementations for
//! type-safe lookup of one or all services of a type, plus tracing of those lookups.
//! Implementors only supply the type-erased lookups and access to their trace slot.

use std::any::TypeId;
use std::sync::{Arc, Mutex};

use crate::{ErasedService, RegistryError, RegistryEvent, TraceCallback};

/// Storage for an optional trace callback, shared by resolvers.
pub type TraceSlot = Mutex<Option<Arc<TraceCallback>>>;

/// Read side of the container.
///
/// Services are looked up by type. Each type may have several registrations:
/// [`get_service`](ServiceResolver::get_service) returns the most recent one and
/// [`get_services`](ServiceResolver::get_services) returns all of them in registration order.
pub trait ServiceResolver {
    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Access the trace callback slot.
    fn trace(&self) -> &TraceSlot;

    /// Set a tracing callback for resolve operations.
    ///
    /// # Lock Poisoning Recovery
    ///
    /// If the trace lock is poisoned, this method recovers by extracting the inner value.
    fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = self.trace().lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    fn clear_trace_callback(&self) {
        let mut guard = self.trace().lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    /// Invoke the current trace callback, if any.
    ///
    /// The trace lock is released before the callback runs, so the callback may itself
    /// resolve services.
    fn emit_event(&self, event: &RegistryEvent) {
        let callback = self
            .trace()
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------------------------------

    /// Activate the most recent registration for `type_id`, if any.
    fn resolve_last(
        &self,
        type_id: TypeId,
        type_name: &'static str,
    ) -> Result<Option<ErasedService>, RegistryError>;

    /// Activate every registration for `type_id`, in registration order.
    fn resolve_all(
        &self,
        type_id: TypeId,
        type_name: &'static str,
    ) -> Result<Vec<ErasedService>, RegistryError>;

    /// Whether any registration exists for `type_id`.
    fn is_registered(&self, type_id: TypeId) -> bool;

    /// Resolve zero or one service of type `T`.
    ///
    /// Returns `Ok(None)` when nothing is registered for `T`.
    ///
    /// # Errors
    ///
    /// - A factory for `T` (or one of its dependencies) failed
    /// - A circular dependency was detected
    fn get_service<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, RegistryError> {
        let type_name = std::any::type_name::<T>();
        let resolved = self.resolve_last(TypeId::of::<T>(), type_name)?;

        self.emit_event(&RegistryEvent::Resolve {
            type_name,
            found: resolved.is_some(),
        });

        resolved.map(downcast::<T>).transpose()
    }

    /// Resolve every service registered for `T`, in registration order.
    fn get_services<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<T>>, RegistryError> {
        let type_name = std::any::type_name::<T>();
        let resolved = self.resolve_all(TypeId::of::<T>(), type_name)?;

        self.emit_event(&RegistryEvent::ResolveAll {
            type_name,
            count: resolved.len(),
        });

        resolved.into_iter().map(downcast::<T>).collect()
    }

    /// Resolve exactly one service of type `T`.
    ///
    /// # Errors
    ///
    /// Everything `get_service` returns, plus `ServiceNotFound` when `T` is not registered.
    fn get_required_service<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, RegistryError> {
        self.get_service::<T>()?.ok_or(RegistryError::ServiceNotFound {
            type_name: std::any::type_name::<T>(),
        })
    }

    /// Check if a type is registered.
    fn contains<T: ?Sized + 'static>(&self) -> bool {
        let found = self.is_registered(TypeId::of::<T>());

        self.emit_event(&RegistryEvent::Contains {
            type_name: std::any::type_name::<T>(),
            found,
        });

        found
    }
}

fn downcast<T: ?Sized + Send + Sync + 'static>(erased: ErasedService) -> Result<Arc<T>, RegistryError> {
    (*erased)
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or(RegistryError::TypeMismatch {
            type_name: std::any::type_name::<T>(),
        })
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
