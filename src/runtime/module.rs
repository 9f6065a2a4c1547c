//! Runtime module contract, module graph walking and population.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;

use thiserror::Error;

use super::collection::{ServiceCollection, TypeKey};

/// Errors raised while building the module list at runtime.
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("Module provider for {module} failed: {message}")]
    Provider { module: String, message: String },
}

/// Access to the concrete type behind a module trait object.
pub trait AsAnyModule {
    fn as_any(&self) -> &dyn Any;
}

impl<T: DependencyModule> AsAnyModule for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A unit of service registration.
///
/// Implementations are normally generated from `#[module]` declarations.
pub trait DependencyModule: AsAnyModule + Send + Sync + 'static {
    /// Name used in logs and errors.
    fn module_name(&self) -> &'static str;

    /// Modules this module declares as dependencies.
    fn referenced_modules(&self) -> Vec<ModuleRef> {
        Vec::new()
    }

    /// Modules found through alternate discovery, walked after references.
    fn extra_modules(&self) -> Vec<ModuleRef> {
        Vec::new()
    }

    /// Applies this module's own registrations, without walking references.
    fn apply_services(&self, services: &mut ServiceCollection);

    /// Programmatic configuration run right after `apply_services`.
    fn configure(&self, _services: &mut ServiceCollection) {}

    /// Module equality used to collapse duplicates.
    ///
    /// Defaults to "same declared type"; parameterized modules override it
    /// with value equality (see [`value_eq`]).
    fn module_eq(&self, other: &dyn DependencyModule) -> bool {
        self.as_any().type_id() == other.as_any().type_id()
    }

    /// Feature types this module provides.
    fn provided_features(&self) -> Vec<TypeKey> {
        Vec::new()
    }

    /// Ordering key among providers of the same feature.
    fn feature_order(&self) -> i32 {
        0
    }

    /// Feature types this module handles.
    fn handled_features(&self) -> Vec<TypeKey> {
        Vec::new()
    }

    /// Receives every loaded provider of a handled feature, in feature order.
    fn handle_feature(
        &self,
        _feature: &TypeKey,
        _providers: &[Arc<dyn DependencyModule>],
        _services: &mut ServiceCollection,
    ) {
    }
}

/// Value equality for modules that implement `PartialEq`.
pub fn value_eq<T>(this: &T, other: &dyn DependencyModule) -> bool
where
    T: DependencyModule + PartialEq,
{
    other
        .as_any()
        .downcast_ref::<T>()
        .is_some_and(|other| other == this)
}

/// Programmatic configuration hook for modules declared with `configure`.
pub trait ConfigureServices {
    fn configure(&self, services: &mut ServiceCollection);
}

/// Feature handling hook for modules declared with `handles(...)`.
pub trait FeatureHandler {
    fn handle_feature(
        &self,
        feature: &TypeKey,
        providers: &[Arc<dyn DependencyModule>],
        services: &mut ServiceCollection,
    );
}

/// Lazily constructs a referenced module.
pub trait ModuleProvider: Send + Sync {
    fn provide(&self) -> Result<Arc<dyn DependencyModule>, ModuleError>;
}

impl<F> ModuleProvider for F
where
    F: Fn() -> Result<Arc<dyn DependencyModule>, ModuleError> + Send + Sync,
{
    fn provide(&self) -> Result<Arc<dyn DependencyModule>, ModuleError> {
        self()
    }
}

/// A reference from one module to another.
pub enum ModuleRef {
    Module(Arc<dyn DependencyModule>),
    Provider(Box<dyn ModuleProvider>),
}

impl ModuleRef {
    pub fn module(module: impl DependencyModule) -> Self {
        ModuleRef::Module(Arc::new(module))
    }

    pub fn provider(
        provider: impl Fn() -> Result<Arc<dyn DependencyModule>, ModuleError> + Send + Sync + 'static,
    ) -> Self {
        ModuleRef::Provider(Box::new(provider))
    }

    /// Resolves the reference; provider failures are returned unchanged.
    pub fn resolve(self) -> Result<Arc<dyn DependencyModule>, ModuleError> {
        match self {
            ModuleRef::Module(module) => Ok(module),
            ModuleRef::Provider(provider) => provider.provide(),
        }
    }
}

impl std::fmt::Debug for ModuleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleRef::Module(module) => f.debug_tuple("Module").field(&module.module_name()).finish(),
            ModuleRef::Provider(_) => f.write_str("Provider"),
        }
    }
}

/// Flattens the transitive module graph rooted at `roots`.
///
/// Each module is placed at the front of the list the first time it is
/// reached and its references are walked afterwards; a module equal to one
/// already in the list is skipped, so cycles terminate. Any provider
/// failure aborts the walk.
pub fn walk_modules(
    roots: impl IntoIterator<Item = Arc<dyn DependencyModule>>,
) -> Result<Vec<Arc<dyn DependencyModule>>, ModuleError> {
    let mut list = VecDeque::new();
    for root in roots {
        walk(root, &mut list)?;
    }
    Ok(list.into())
}

fn walk(
    node: Arc<dyn DependencyModule>,
    list: &mut VecDeque<Arc<dyn DependencyModule>>,
) -> Result<(), ModuleError> {
    if list.iter().any(|existing| existing.module_eq(node.as_ref())) {
        return Ok(());
    }
    list.push_front(Arc::clone(&node));

    for reference in node.referenced_modules() {
        walk(reference.resolve()?, list)?;
    }
    for extra in node.extra_modules() {
        walk(extra.resolve()?, list)?;
    }
    Ok(())
}

/// Applies the module graph rooted at `roots` to a collection.
///
/// Modules already applied to the collection are skipped, which makes
/// adding the same logical module twice idempotent. Feature handlers run
/// after every module of the walk has been applied.
pub fn populate(
    roots: impl IntoIterator<Item = Arc<dyn DependencyModule>>,
    services: &mut ServiceCollection,
) -> Result<(), ModuleError> {
    let modules = walk_modules(roots)?;
    let mut handlers = Vec::new();

    for module in &modules {
        if services.is_applied(module.as_ref()) {
            tracing::debug!("Module {} already applied", module.module_name());
            continue;
        }
        tracing::debug!("Applying module {}", module.module_name());
        module.apply_services(services);
        module.configure(services);
        services.mark_applied(Arc::clone(module));
        if !module.handled_features().is_empty() {
            handlers.push(Arc::clone(module));
        }
    }

    for handler in handlers {
        for feature in handler.handled_features() {
            let providers = feature_providers(&modules, &feature);
            handler.handle_feature(&feature, &providers, services);
        }
    }
    Ok(())
}

/// Providers of a feature ordered by feature order, then walk position.
fn feature_providers(
    modules: &[Arc<dyn DependencyModule>],
    feature: &TypeKey,
) -> Vec<Arc<dyn DependencyModule>> {
    let mut providers: Vec<_> = modules
        .iter()
        .filter(|m| m.provided_features().contains(feature))
        .cloned()
        .collect();
    providers.sort_by_key(|m| m.feature_order());
    providers
}

/// Application-facing helpers for loading modules into a collection.
pub trait ServiceCollectionExt {
    /// Adds a module and everything it references.
    fn add_module<M: DependencyModule>(&mut self, module: M) -> Result<&mut Self, ModuleError>;

    /// Adds explicit module instances, walked as one graph.
    fn add_modules(
        &mut self,
        modules: impl IntoIterator<Item = Arc<dyn DependencyModule>>,
    ) -> Result<&mut Self, ModuleError>;
}

impl ServiceCollectionExt for ServiceCollection {
    fn add_module<M: DependencyModule>(&mut self, module: M) -> Result<&mut Self, ModuleError> {
        let root: Arc<dyn DependencyModule> = Arc::new(module);
        populate([root], self)?;
        Ok(self)
    }

    fn add_modules(
        &mut self,
        modules: impl IntoIterator<Item = Arc<dyn DependencyModule>>,
    ) -> Result<&mut Self, ModuleError> {
        populate(modules, self)?;
        Ok(self)
    }
}
