//! Translation of resolved registrations into container operations.
//!
//! The operations produced here are exactly what a generated registrations
//! file performs when applied, so they double as the model the renderer
//! works from.

use crate::runtime::{FactoryRef, Implementation, RegistrationOp, ServiceRegistration, TypeKey};

use super::resolver::{ResolvedImplementation, ResolvedModule, ResolvedRegistration};

/// Emits the ordered container operations of a resolved module.
pub fn emit_registrations(module: &ResolvedModule) -> Vec<RegistrationOp> {
    module.registrations.iter().map(emit_one).collect()
}

fn emit_one(resolved: &ResolvedRegistration) -> RegistrationOp {
    let mut registration = ServiceRegistration::new(
        TypeKey::owned(resolved.service.key()),
        implementation(&resolved.implementation),
        resolved.lifetime,
    );
    if let Some(key) = &resolved.key {
        registration = registration.with_key(key.clone());
    }

    match &resolved.cross_wire {
        Some(interfaces) => RegistrationOp::CrossWire {
            registration,
            interfaces: interfaces.iter().map(|i| TypeKey::owned(i.key())).collect(),
            verb: resolved.verb,
        },
        None => RegistrationOp::for_verb(resolved.verb, registration),
    }
}

fn implementation(implementation: &ResolvedImplementation) -> Implementation {
    match implementation {
        ResolvedImplementation::Type(ty) => Implementation::Type(TypeKey::owned(ty.key())),
        ResolvedImplementation::Factory { path } => {
            Implementation::Factory(FactoryRef::named(path.clone()))
        }
        ResolvedImplementation::Glue { name } => {
            Implementation::Factory(FactoryRef::named(name.clone()))
        }
    }
}
