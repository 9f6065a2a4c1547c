//! A small application wired through checked-in generated units.
//!
//! The files under `generated/` are the output of running the generator over
//! this directory. `tests/generation.rs` regenerates them and fails when they
//! drift; set `WIREGEN_UPDATE_FIXTURES=1` to rewrite them.

#![allow(dead_code)]

mod config;
mod greet;
mod http;
mod mail;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use wiregen::runtime::testing::{load_module, load_modules};
use wiregen::runtime::{
    instance, AsAnyModule, DependencyModule, Implementation, Instance, Lifetime, ModuleRef,
    ResolveError, ServiceCollection, ServiceResolver, TypeKey,
};

use crate::config::Settings;
use crate::http::{HttpModule, HttpModuleDependency, HttpModuleServiceCollectionExt};
use crate::mail::SmtpMailer;

/// Root module of the application.
#[wiregen::module(depends_on(http::HttpModule(8080, verbose = true)))]
#[derive(Default)]
pub struct AppModule;

/// A module with no realm services of its own.
#[wiregen::module]
#[derive(Default)]
pub struct ReportingModule;

#[wiregen::transient]
pub struct Clock;

include!("generated/crate.AppModule.module.g.rs");
include!("generated/crate.AppModule.registrations.g.rs");
include!("generated/crate.ReportingModule.module.g.rs");
include!("generated/crate.ReportingModule.registrations.g.rs");

fn key(name: &'static str) -> TypeKey {
    TypeKey::named(name)
}

struct MapResolver(HashMap<TypeKey, Instance>);

impl ServiceResolver for MapResolver {
    fn resolve(&self, service: &TypeKey, _key: Option<&str>) -> Result<Instance, ResolveError> {
        self.0
            .get(service)
            .cloned()
            .ok_or_else(|| ResolveError::NotRegistered {
                service: service.to_string(),
            })
    }
}

#[test]
fn test_realm_services_stay_in_their_realm() {
    let app = load_module(AppModule).unwrap();
    assert!(app.contains(&key("crate::Clock"), None));
    assert!(app.contains(&key("crate::greet::English"), None));
    assert!(app.contains(&key("crate::mail::SmtpMailer"), None));

    let reporting = load_module(ReportingModule).unwrap();
    assert_eq!(reporting.len(), 1);
    assert!(reporting.contains(&key("crate::Clock"), None));
    assert!(!reporting.contains(&key("crate::greet::English"), None));
}

#[test]
fn test_only_realm_module_skips_global_services() {
    let http = load_module(HttpModule::new(80)).unwrap();
    assert!(http.contains(&key("crate::http::Router"), None));
    assert!(!http.contains(&key("crate::Clock"), None));
    assert_eq!(
        http.get(&key("crate::http::Router"), None).unwrap().lifetime,
        Lifetime::Scoped
    );
}

#[test]
fn test_keyed_service_only_under_its_key() {
    let app = load_module(AppModule).unwrap();
    let greeter = key("crate::greet::Greeter");

    let french = app.get(&greeter, Some("fr")).unwrap();
    assert_eq!(
        french.implementation,
        Implementation::Type(key("crate::greet::French"))
    );
    assert!(!app.contains(&greeter, Some("de")));

    let unkeyed = app.resolve_target(&greeter, None).unwrap();
    assert_eq!(unkeyed.service, key("crate::greet::English"));
}

#[test]
fn test_cross_wired_contracts_share_one_registration() {
    let app = load_module(AppModule).unwrap();
    let greeter = app.resolve_target(&key("crate::greet::Greeter"), None).unwrap();
    let farewell = app.resolve_target(&key("crate::greet::Farewell"), None).unwrap();
    assert!(std::ptr::eq(greeter, farewell));
    assert_eq!(greeter.lifetime, Lifetime::Singleton);
}

#[test]
fn test_reference_passes_arguments_and_properties() {
    let app = load_module(AppModule).unwrap();
    let http = app
        .applied_modules()
        .iter()
        .find_map(|module| module.as_any().downcast_ref::<HttpModule>())
        .unwrap();
    assert_eq!(http.port, 8080);
    assert!(http.verbose);
    assert_eq!(http.timeout, Duration::from_secs(30));
}

#[test]
fn test_parameterized_modules_collapse_by_value() {
    let same: Vec<Arc<dyn DependencyModule>> =
        vec![Arc::new(HttpModule::new(80)), Arc::new(HttpModule::new(80))];
    assert_eq!(load_modules(same).unwrap().len(), 1);

    let distinct: Vec<Arc<dyn DependencyModule>> =
        vec![Arc::new(HttpModule::new(80)), Arc::new(HttpModule::new(8080))];
    assert_eq!(load_modules(distinct).unwrap().len(), 2);
}

#[test]
fn test_factory_glue_resolves_parameters() {
    let app = load_module(AppModule).unwrap();
    let registration = app.get(&key("crate::mail::SmtpMailer"), None).unwrap();
    let Implementation::Factory(factory) = &registration.implementation else {
        panic!("expected a factory, got {:?}", registration.implementation);
    };
    assert_eq!(factory.name(), "__wiregen_glue_mail_smtpmailer_create");
    let invoke = factory.invoke().unwrap();

    let settings = Settings {
        sender: "ops@example.com".to_string(),
    };
    let resolver = MapResolver(HashMap::from([
        (key("crate::config::Settings"), instance(Arc::new(settings))),
        (key("u32"), instance(Arc::new(3u32))),
    ]));
    let created = invoke(&resolver).unwrap();
    let mailer = created.downcast_ref::<Arc<SmtpMailer>>().unwrap();
    assert_eq!(mailer.sender, "ops@example.com");
    assert_eq!(mailer.retries, 3);

    let empty = MapResolver(HashMap::new());
    assert!(matches!(
        invoke(&empty),
        Err(ResolveError::NotRegistered { .. })
    ));
}

#[test]
fn test_companion_marker_and_extension_method() {
    let module = HttpModuleDependency::new(9090)
        .with_verbose(true)
        .with_timeout(Duration::from_secs(5))
        .into_module();
    assert_eq!(module.port, 9090);
    assert!(module.verbose);
    assert_eq!(module.timeout, Duration::from_secs(5));

    let reference: ModuleRef = HttpModuleDependency::new(1).into();
    assert_eq!(
        reference.resolve().unwrap().module_name(),
        "crate::http::HttpModule"
    );

    let mut services = ServiceCollection::new();
    services.add_http(9090).unwrap();
    assert!(services.contains(&key("crate::http::Router"), None));
}
