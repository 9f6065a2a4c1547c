//! Container registration state and the operations that mutate it.

use std::borrow::Cow;
use std::sync::Arc;

use super::module::DependencyModule;
use super::resolver::FactoryFn;
use crate::models::{Lifetime, RegistrationType};

/// Key a service or implementation is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(Cow<'static, str>);

impl TypeKey {
    /// Key for a path literal, usable in statics.
    pub const fn named(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn owned(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A factory referenced by path, optionally with the callable behind it.
///
/// Equality is by name so registrations built from descriptors compare
/// equal to the ones emitted into generated code.
#[derive(Clone)]
pub struct FactoryRef {
    name: Cow<'static, str>,
    invoke: Option<FactoryFn>,
}

impl FactoryRef {
    pub const fn new(name: &'static str, invoke: FactoryFn) -> Self {
        Self {
            name: Cow::Borrowed(name),
            invoke: Some(invoke),
        }
    }

    /// A factory known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            invoke: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoke(&self) -> Option<FactoryFn> {
        self.invoke
    }
}

impl PartialEq for FactoryRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for FactoryRef {}

impl std::fmt::Debug for FactoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRef")
            .field("name", &self.name)
            .field("callable", &self.invoke.is_some())
            .finish()
    }
}

/// How the container obtains an instance for a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Implementation {
    /// Construct the implementation type.
    Type(TypeKey),
    /// Call a factory.
    Factory(FactoryRef),
    /// Resolve another registration of the same key (cross-wiring).
    Forward(TypeKey),
}

/// One entry in the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRegistration {
    pub service: TypeKey,
    pub key: Option<Cow<'static, str>>,
    pub implementation: Implementation,
    pub lifetime: Lifetime,
}

impl ServiceRegistration {
    pub fn new(service: TypeKey, implementation: Implementation, lifetime: Lifetime) -> Self {
        Self {
            service,
            key: None,
            implementation,
            lifetime,
        }
    }

    pub fn with_key(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.key = Some(key.into());
        self
    }

    fn same_service(&self, other: &ServiceRegistration) -> bool {
        self.service == other.service && self.key == other.key
    }
}

/// A container mutation produced by registration emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOp {
    /// Append an unkeyed registration.
    AddStandard(ServiceRegistration),
    /// Append a keyed registration.
    AddKeyed(ServiceRegistration),
    /// Append unless the service (and key) is already registered.
    TryAdd(ServiceRegistration),
    /// Append unless this implementation is already registered for the service.
    TryAddEnumerable(ServiceRegistration),
    /// Replace the first registration of the service (and key).
    Replace(ServiceRegistration),
    /// Register the implementation under itself and forward every interface to it.
    CrossWire {
        registration: ServiceRegistration,
        interfaces: Vec<TypeKey>,
        verb: RegistrationType,
    },
}

impl RegistrationOp {
    /// Wraps a registration in the operation shape for a verb.
    pub fn for_verb(verb: RegistrationType, registration: ServiceRegistration) -> Self {
        match verb {
            RegistrationType::Add if registration.key.is_some() => {
                RegistrationOp::AddKeyed(registration)
            }
            RegistrationType::Add => RegistrationOp::AddStandard(registration),
            RegistrationType::Try => RegistrationOp::TryAdd(registration),
            RegistrationType::TryEnumerable => RegistrationOp::TryAddEnumerable(registration),
            RegistrationType::Replace => RegistrationOp::Replace(registration),
        }
    }
}

/// Ordered registration state of a container.
///
/// Only records what is registered; constructing instances is left to the
/// container the registrations are handed to.
#[derive(Default)]
pub struct ServiceCollection {
    registrations: Vec<ServiceRegistration>,
    applied_modules: Vec<Arc<dyn DependencyModule>>,
}

impl std::fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("registrations", &self.registrations)
            .field("applied_modules", &self.applied_modules.len())
            .finish()
    }
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registrations(&self) -> &[ServiceRegistration] {
        &self.registrations
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn add(&mut self, registration: ServiceRegistration) -> &mut Self {
        self.registrations.push(registration);
        self
    }

    pub fn try_add(&mut self, registration: ServiceRegistration) -> &mut Self {
        if !self
            .registrations
            .iter()
            .any(|existing| existing.same_service(&registration))
        {
            self.registrations.push(registration);
        }
        self
    }

    pub fn try_add_enumerable(&mut self, registration: ServiceRegistration) -> &mut Self {
        if !self.registrations.iter().any(|existing| {
            existing.same_service(&registration)
                && existing.implementation == registration.implementation
        }) {
            self.registrations.push(registration);
        }
        self
    }

    pub fn replace(&mut self, registration: ServiceRegistration) -> &mut Self {
        if let Some(position) = self
            .registrations
            .iter()
            .position(|existing| existing.same_service(&registration))
        {
            self.registrations.remove(position);
        }
        self.registrations.push(registration);
        self
    }

    /// Registers `registration` under its own service and every interface.
    ///
    /// Interfaces forward to the implementation registration, so they all
    /// share one instance when the lifetime caches instances.
    pub fn cross_wire(
        &mut self,
        registration: ServiceRegistration,
        interfaces: &[TypeKey],
        verb: RegistrationType,
    ) -> &mut Self {
        let target = registration.service.clone();
        let key = registration.key.clone();
        let lifetime = registration.lifetime;
        self.apply_verb(verb, registration);
        for interface in interfaces {
            let forward = ServiceRegistration {
                service: interface.clone(),
                key: key.clone(),
                implementation: Implementation::Forward(target.clone()),
                lifetime,
            };
            self.apply_verb(verb, forward);
        }
        self
    }

    fn apply_verb(&mut self, verb: RegistrationType, registration: ServiceRegistration) {
        match verb {
            RegistrationType::Add => self.add(registration),
            RegistrationType::Try => self.try_add(registration),
            RegistrationType::TryEnumerable => self.try_add_enumerable(registration),
            RegistrationType::Replace => self.replace(registration),
        };
    }

    pub fn apply(&mut self, op: &RegistrationOp) -> &mut Self {
        match op {
            RegistrationOp::AddStandard(r) | RegistrationOp::AddKeyed(r) => self.add(r.clone()),
            RegistrationOp::TryAdd(r) => self.try_add(r.clone()),
            RegistrationOp::TryAddEnumerable(r) => self.try_add_enumerable(r.clone()),
            RegistrationOp::Replace(r) => self.replace(r.clone()),
            RegistrationOp::CrossWire {
                registration,
                interfaces,
                verb,
            } => self.cross_wire(registration.clone(), interfaces, *verb),
        }
    }

    /// Applies operations in order.
    pub fn apply_all<'a>(&mut self, ops: impl IntoIterator<Item = &'a RegistrationOp>) -> &mut Self {
        for op in ops {
            self.apply(op);
        }
        self
    }

    /// All registrations of a service under exactly this key.
    pub fn find(
        &self,
        service: &TypeKey,
        key: Option<&str>,
    ) -> impl Iterator<Item = &ServiceRegistration> + '_ {
        let service = service.clone();
        let key = key.map(str::to_owned);
        self.registrations
            .iter()
            .filter(move |r| r.service == service && r.key.as_deref() == key.as_deref())
    }

    /// The registration a single lookup would use: the last one registered.
    pub fn get(&self, service: &TypeKey, key: Option<&str>) -> Option<&ServiceRegistration> {
        self.find(service, key).last()
    }

    /// Follows forwarding registrations to the one that produces the instance.
    pub fn resolve_target(
        &self,
        service: &TypeKey,
        key: Option<&str>,
    ) -> Option<&ServiceRegistration> {
        let mut current = self.get(service, key)?;
        // Bounded by the number of registrations to stop on forwarding loops.
        for _ in 0..self.registrations.len() {
            match &current.implementation {
                Implementation::Forward(target) => current = self.get(target, key)?,
                _ => return Some(current),
            }
        }
        None
    }

    pub fn contains(&self, service: &TypeKey, key: Option<&str>) -> bool {
        self.get(service, key).is_some()
    }

    /// Whether a module equal to `module` already contributed its services.
    pub fn is_applied(&self, module: &dyn DependencyModule) -> bool {
        self.applied_modules
            .iter()
            .any(|applied| applied.module_eq(module))
    }

    pub(crate) fn mark_applied(&mut self, module: Arc<dyn DependencyModule>) {
        self.applied_modules.push(module);
    }

    pub fn applied_modules(&self) -> &[Arc<dyn DependencyModule>] {
        &self.applied_modules
    }
}
