use std::time::Duration;

/// Serves requests; accepts only registrations aimed at it.
#[wiregen::module(only_realm, auto_equality, generate_attribute, use_method = "add_http")]
pub struct HttpModule {
    pub port: u16,
    pub verbose: bool,
    pub timeout: Duration,
}

impl HttpModule {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            verbose: false,
            timeout: Duration::from_secs(30),
        }
    }
}

#[wiregen::scoped(realm = HttpModule)]
pub struct Router;

include!("generated/crate.http.HttpModule.module.g.rs");
include!("generated/crate.http.HttpModule.registrations.g.rs");
