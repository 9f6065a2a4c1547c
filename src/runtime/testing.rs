//! Test-time module loading.

use std::sync::Arc;

use super::collection::ServiceCollection;
use super::module::{populate, DependencyModule, ModuleError};

/// Builds a fresh collection populated from `modules`.
///
/// Tests use this to get exactly the registrations a set of modules
/// contributes, without any application-level setup.
pub fn load_modules(
    modules: impl IntoIterator<Item = Arc<dyn DependencyModule>>,
) -> Result<ServiceCollection, ModuleError> {
    let mut services = ServiceCollection::new();
    populate(modules, &mut services)?;
    Ok(services)
}

/// Builds a fresh collection populated from a single module.
pub fn load_module(module: impl DependencyModule) -> Result<ServiceCollection, ModuleError> {
    let root: Arc<dyn DependencyModule> = Arc::new(module);
    load_modules([root])
}
