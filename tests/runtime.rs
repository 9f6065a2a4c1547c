//! Runtime behavior of hand-written modules: graph walking, duplicate
//! collapse, keyed lookups, cross-wiring and feature handling.

use std::sync::{Arc, Mutex};

use wiregen::runtime::testing::{load_module, load_modules};
use wiregen::runtime::{
    value_eq, walk_modules, DependencyModule, Implementation, Lifetime, ModuleError, ModuleRef,
    RegistrationOp, RegistrationType, ServiceCollection, ServiceCollectionExt,
    ServiceRegistration, TypeKey,
};

fn registration(service: &'static str, implementation: &'static str) -> ServiceRegistration {
    ServiceRegistration::new(
        TypeKey::named(service),
        Implementation::Type(TypeKey::named(implementation)),
        Lifetime::Transient,
    )
}

fn names(modules: &[Arc<dyn DependencyModule>]) -> Vec<&'static str> {
    modules.iter().map(|m| m.module_name()).collect()
}

#[derive(Default)]
struct TestModule;

impl DependencyModule for TestModule {
    fn module_name(&self) -> &'static str {
        "TestModule"
    }

    fn apply_services(&self, services: &mut ServiceCollection) {
        services.add(registration("tests::Greeter", "tests::English"));
    }
}

#[derive(Default)]
struct TestModule2;

impl DependencyModule for TestModule2 {
    fn module_name(&self) -> &'static str {
        "TestModule2"
    }

    fn referenced_modules(&self) -> Vec<ModuleRef> {
        vec![ModuleRef::module(TestModule)]
    }

    fn apply_services(&self, _services: &mut ServiceCollection) {}
}

struct Combined;

impl DependencyModule for Combined {
    fn module_name(&self) -> &'static str {
        "Combined"
    }

    fn referenced_modules(&self) -> Vec<ModuleRef> {
        vec![ModuleRef::module(TestModule), ModuleRef::module(TestModule2)]
    }

    fn apply_services(&self, _services: &mut ServiceCollection) {}
}

/// `Combined` reaches `TestModule` directly and through `TestModule2`.
/// Module equality collapses the two references, so the one registration
/// `TestModule` contributes is applied once. Registrations themselves are
/// never deduplicated; see `test_distinct_modules_keep_their_registrations`.
#[test]
fn test_combined_module_registers_once() {
    let services = load_module(Combined).unwrap();
    let greeter = TypeKey::named("tests::Greeter");
    assert_eq!(services.find(&greeter, None).count(), 1);
    assert_eq!(
        names(services.applied_modules()),
        vec!["TestModule2", "TestModule", "Combined"]
    );
}

struct SpanishModule;

impl DependencyModule for SpanishModule {
    fn module_name(&self) -> &'static str {
        "SpanishModule"
    }

    fn apply_services(&self, services: &mut ServiceCollection) {
        services.add(registration("tests::Greeter", "tests::English"));
    }
}

#[test]
fn test_distinct_modules_keep_their_registrations() {
    let roots: Vec<Arc<dyn DependencyModule>> = vec![Arc::new(TestModule), Arc::new(SpanishModule)];
    let services = load_modules(roots).unwrap();
    let greeter = TypeKey::named("tests::Greeter");
    assert_eq!(services.find(&greeter, None).count(), 2);

    let repeated: Vec<Arc<dyn DependencyModule>> = vec![Arc::new(TestModule), Arc::new(TestModule)];
    let services = load_modules(repeated).unwrap();
    assert_eq!(services.find(&greeter, None).count(), 1);
}

#[test]
fn test_adding_module_twice_is_idempotent() {
    let mut services = ServiceCollection::new();
    services.add_module(TestModule).unwrap();
    services.add_module(Combined).unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services.applied_modules().len(), 3);
}

struct CycleA;
struct CycleB;

impl DependencyModule for CycleA {
    fn module_name(&self) -> &'static str {
        "CycleA"
    }

    fn referenced_modules(&self) -> Vec<ModuleRef> {
        vec![ModuleRef::module(CycleB)]
    }

    fn apply_services(&self, _services: &mut ServiceCollection) {}
}

impl DependencyModule for CycleB {
    fn module_name(&self) -> &'static str {
        "CycleB"
    }

    fn referenced_modules(&self) -> Vec<ModuleRef> {
        vec![ModuleRef::module(CycleA)]
    }

    fn apply_services(&self, _services: &mut ServiceCollection) {}
}

#[test]
fn test_cycle_walk_terminates() {
    let root: Arc<dyn DependencyModule> = Arc::new(CycleA);
    let modules = walk_modules([root]).unwrap();
    assert_eq!(names(&modules), vec!["CycleB", "CycleA"]);
}

#[derive(PartialEq)]
struct PortModule {
    port: u16,
}

impl DependencyModule for PortModule {
    fn module_name(&self) -> &'static str {
        "PortModule"
    }

    fn apply_services(&self, services: &mut ServiceCollection) {
        let key = if self.port == 80 { "http" } else { "other" };
        services.add(registration("tests::Listener", "tests::TcpListener").with_key(key));
    }

    fn module_eq(&self, other: &dyn DependencyModule) -> bool {
        value_eq(self, other)
    }
}

#[test]
fn test_parameterized_modules_compare_by_value() {
    let distinct: Vec<Arc<dyn DependencyModule>> = vec![
        Arc::new(PortModule { port: 80 }),
        Arc::new(PortModule { port: 8080 }),
    ];
    let services = load_modules(distinct).unwrap();
    assert_eq!(services.len(), 2);

    let same: Vec<Arc<dyn DependencyModule>> = vec![
        Arc::new(PortModule { port: 80 }),
        Arc::new(PortModule { port: 80 }),
    ];
    let services = load_modules(same).unwrap();
    assert_eq!(services.len(), 1);
}

#[test]
fn test_keyed_registration_lookup() {
    let mut services = ServiceCollection::new();
    let mut keyed = registration("tests::Greeter", "tests::English");
    keyed.key = Some("A".into());
    services.apply(&RegistrationOp::for_verb(RegistrationType::Add, keyed));

    let greeter = TypeKey::named("tests::Greeter");
    assert!(services.contains(&greeter, Some("A")));
    assert!(!services.contains(&greeter, None));
    assert!(!services.contains(&greeter, Some("B")));
}

#[test]
fn test_cross_wire_resolves_to_one_registration() {
    let mut services = ServiceCollection::new();
    let mut cache = registration("tests::MemoryCache", "tests::MemoryCache");
    cache.lifetime = Lifetime::Singleton;
    services.apply(&RegistrationOp::CrossWire {
        registration: cache,
        interfaces: vec![TypeKey::named("tests::Reader"), TypeKey::named("tests::Writer")],
        verb: RegistrationType::Add,
    });

    let reader = services
        .resolve_target(&TypeKey::named("tests::Reader"), None)
        .unwrap();
    let writer = services
        .resolve_target(&TypeKey::named("tests::Writer"), None)
        .unwrap();
    assert!(std::ptr::eq(reader, writer));
    assert_eq!(reader.service, TypeKey::named("tests::MemoryCache"));
    assert_eq!(reader.lifetime, Lifetime::Singleton);
}

struct Failing;

impl DependencyModule for Failing {
    fn module_name(&self) -> &'static str {
        "Failing"
    }

    fn referenced_modules(&self) -> Vec<ModuleRef> {
        vec![ModuleRef::provider(|| {
            Err(ModuleError::Provider {
                module: "Remote".to_string(),
                message: "unavailable".to_string(),
            })
        })]
    }

    fn apply_services(&self, services: &mut ServiceCollection) {
        services.add(registration("tests::Greeter", "tests::English"));
    }
}

#[test]
fn test_provider_failure_aborts_population() {
    let mut services = ServiceCollection::new();
    let result = services.add_module(Failing);
    assert!(matches!(result, Err(ModuleError::Provider { .. })));
    assert!(services.is_empty());
}

struct RouteProvider {
    route: &'static str,
    order: i32,
}

impl PartialEq for RouteProvider {
    fn eq(&self, other: &Self) -> bool {
        self.route == other.route
    }
}

impl DependencyModule for RouteProvider {
    fn module_name(&self) -> &'static str {
        self.route
    }

    fn apply_services(&self, _services: &mut ServiceCollection) {}

    fn module_eq(&self, other: &dyn DependencyModule) -> bool {
        value_eq(self, other)
    }

    fn provided_features(&self) -> Vec<TypeKey> {
        vec![TypeKey::named("tests::Routes")]
    }

    fn feature_order(&self) -> i32 {
        self.order
    }
}

struct Router {
    seen: Arc<Mutex<Vec<&'static str>>>,
}

impl DependencyModule for Router {
    fn module_name(&self) -> &'static str {
        "Router"
    }

    fn referenced_modules(&self) -> Vec<ModuleRef> {
        vec![
            ModuleRef::module(RouteProvider {
                route: "/late",
                order: 5,
            }),
            ModuleRef::module(RouteProvider {
                route: "/early",
                order: -1,
            }),
        ]
    }

    fn apply_services(&self, _services: &mut ServiceCollection) {}

    fn handled_features(&self) -> Vec<TypeKey> {
        vec![TypeKey::named("tests::Routes")]
    }

    fn handle_feature(
        &self,
        _feature: &TypeKey,
        providers: &[Arc<dyn DependencyModule>],
        _services: &mut ServiceCollection,
    ) {
        let mut seen = self.seen.lock().unwrap();
        seen.extend(providers.iter().map(|p| p.module_name()));
    }
}

#[test]
fn test_feature_handler_sees_providers_in_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    load_module(Router { seen: seen.clone() }).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec!["/early", "/late"]);
}
