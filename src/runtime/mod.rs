//! Runtime surface used by generated code and applications.
//!
//! Generated module units implement [`DependencyModule`] and hold their
//! registrations as lazily built [`RegistrationOp`] lists. Applications load
//! modules into a [`ServiceCollection`]:
//!
//! ```ignore
//! use wiregen::runtime::{ServiceCollection, ServiceCollectionExt};
//!
//! let mut services = ServiceCollection::new();
//! services.add_module(AppModule::default())?;
//! ```

mod collection;
mod module;
mod resolver;
pub mod testing;

pub use collection::{
    FactoryRef, Implementation, RegistrationOp, ServiceCollection, ServiceRegistration, TypeKey,
};
pub use module::{
    populate, value_eq, walk_modules, AsAnyModule, ConfigureServices, DependencyModule,
    FeatureHandler, ModuleError, ModuleProvider, ModuleRef, ServiceCollectionExt,
};
pub use resolver::{instance, FactoryFn, Instance, ResolveError, ServiceResolver};

pub use crate::models::{Lifetime, RegistrationType};
