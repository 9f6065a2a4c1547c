//! Contract of the container that turns registrations into instances.

use std::any::Any;
use std::sync::Arc;

use thiserror::Error;

use super::collection::TypeKey;

/// A resolved service instance. Holds an `Arc<T>` for the service type `T`.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Signature of factories handed to the container.
pub type FactoryFn = fn(&dyn ServiceResolver) -> Result<Instance, ResolveError>;

/// Errors raised while resolving services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Service not registered: {service}")]
    NotRegistered { service: String },

    #[error("Service {service} resolved to an unexpected type, expected {expected}")]
    TypeMismatch { service: String, expected: &'static str },
}

/// Resolution surface provided by the container the registrations are applied to.
pub trait ServiceResolver {
    fn resolve(&self, service: &TypeKey, key: Option<&str>) -> Result<Instance, ResolveError>;
}

impl dyn ServiceResolver + '_ {
    /// Resolves an unkeyed service as `Arc<T>`.
    pub fn require<T>(&self, service: &TypeKey) -> Result<Arc<T>, ResolveError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.require_keyed(service, None)
    }

    /// Resolves a service under an optional key as `Arc<T>`.
    pub fn require_keyed<T>(
        &self,
        service: &TypeKey,
        key: Option<&str>,
    ) -> Result<Arc<T>, ResolveError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let instance = self.resolve(service, key)?;
        instance
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(|| ResolveError::TypeMismatch {
                service: service.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }
}

/// Wraps a service value as an [`Instance`].
pub fn instance<T>(value: Arc<T>) -> Instance
where
    T: ?Sized + Send + Sync + 'static,
{
    Arc::new(value)
}
