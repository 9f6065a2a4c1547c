//! Registration resolution: which registrations apply to a module, and how.
//!
//! For a target module, every registration whose realm is the module
//! applies, plus every realm-less registration unless the module is
//! realm-only. The verb comes from the first declared value along
//! registration → module → project, falling back to `Add`. Services are
//! processed in implementation-name order so output is reproducible.

use crate::models::{
    FactoryMethod, Lifetime, ModuleDescriptor, RegistrationModel, RegistrationType,
    ServiceDescriptor, TypeName,
};

/// What the container calls to obtain an instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedImplementation {
    /// Construct the implementation type directly.
    Type(TypeName),
    /// Hand a container-only factory to the container as-is.
    Factory { path: String },
    /// Call a synthesized wrapper that resolves each factory parameter.
    Glue { name: String },
}

/// A registration decided for one module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedRegistration {
    pub implementation_type: TypeName,
    /// Contract the registration is made under.
    pub service: TypeName,
    pub lifetime: Lifetime,
    pub verb: RegistrationType,
    pub key: Option<String>,
    pub implementation: ResolvedImplementation,
    /// Contract traits to forward when the registration is cross-wired.
    pub cross_wire: Option<Vec<TypeName>>,
}

/// All registrations of one module plus the glue factories they use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedModule {
    pub module: TypeName,
    pub registrations: Vec<ResolvedRegistration>,
    /// One wrapper per factory, in first-use order.
    pub glue_factories: Vec<FactoryMethod>,
}

impl ResolvedModule {
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

/// Resolves the registrations that apply to `module`.
pub fn resolve_module(
    module: &ModuleDescriptor,
    services: &[ServiceDescriptor],
    project_default: Option<RegistrationType>,
) -> ResolvedModule {
    let mut sorted: Vec<&ServiceDescriptor> = services.iter().filter(|s| !s.is_empty()).collect();
    sorted.sort_by(|a, b| {
        a.implementation
            .name
            .cmp(&b.implementation.name)
            .then_with(|| a.implementation.namespace.cmp(&b.implementation.namespace))
    });

    let mut resolved = ResolvedModule {
        module: module.ty.clone(),
        registrations: Vec::new(),
        glue_factories: Vec::new(),
    };

    for service in sorted {
        let applicable: Vec<&RegistrationModel> = service
            .registrations
            .iter()
            .filter(|r| r.applies_to(&module.ty, module.only_realm))
            .collect();
        if applicable.is_empty() {
            continue;
        }

        let implementation = implementation_for(service, &mut resolved.glue_factories);

        let mut realms: Vec<Option<&TypeName>> = Vec::new();
        for registration in &applicable {
            if !realms.contains(&registration.realm.as_ref()) {
                realms.push(registration.realm.as_ref());
            }
        }

        for realm in realms {
            let group: Vec<&RegistrationModel> = applicable
                .iter()
                .copied()
                .filter(|r| r.realm.as_ref() == realm)
                .collect();

            if let Some(wired) = group.iter().find(|r| r.cross_wire) {
                let contracts = service.contracts().cloned().collect();
                resolved.registrations.push(ResolvedRegistration {
                    implementation_type: service.implementation.clone(),
                    service: service.implementation.clone(),
                    lifetime: wired.lifetime,
                    verb: verb_for(wired, module, project_default),
                    key: wired.key.clone(),
                    implementation: implementation.clone(),
                    cross_wire: Some(contracts),
                });
                continue;
            }

            for registration in group {
                resolved.registrations.push(ResolvedRegistration {
                    implementation_type: service.implementation.clone(),
                    service: service.service_type(registration),
                    lifetime: registration.lifetime,
                    verb: verb_for(registration, module, project_default),
                    key: registration.key.clone(),
                    implementation: implementation.clone(),
                    cross_wire: None,
                });
            }
        }
    }

    tracing::debug!(
        "Resolved {} registrations for module {}",
        resolved.registrations.len(),
        module.id()
    );
    resolved
}

fn verb_for(
    registration: &RegistrationModel,
    module: &ModuleDescriptor,
    project_default: Option<RegistrationType>,
) -> RegistrationType {
    RegistrationType::resolve(
        registration.registration_type,
        module.registration_type,
        project_default,
    )
}

fn implementation_for(
    service: &ServiceDescriptor,
    glue: &mut Vec<FactoryMethod>,
) -> ResolvedImplementation {
    match &service.factory {
        None => ResolvedImplementation::Type(service.implementation.clone()),
        Some(factory) if factory.takes_container_only() => ResolvedImplementation::Factory {
            path: factory.path.clone(),
        },
        Some(factory) => {
            if !glue.contains(factory) {
                glue.push(factory.clone());
            }
            ResolvedImplementation::Glue {
                name: factory.glue_name(),
            }
        }
    }
}
