//! Descriptor model shared by discovery, resolution and emission.
//!
//! Descriptors are plain immutable data. Every type implements structural
//! equality and hashing so pipeline stages can be cached on their inputs.

mod module;
mod service;
mod types;

pub use module::{ModuleDescriptor, ModuleReference, Parameter, Property, PropertyOverride};
pub use service::{
    is_container_type, is_infrastructure_trait, FactoryMethod, FactoryParameter, ParameterSource,
    RegistrationModel, ServiceDescriptor, CONTAINER_TYPE, INFRASTRUCTURE_TRAITS,
};
pub use types::{Lifetime, RegistrationType, TypeName};
