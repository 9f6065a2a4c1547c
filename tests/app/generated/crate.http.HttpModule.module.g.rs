// @generated by wiregen. Do not edit by hand.
impl ::wiregen::runtime::DependencyModule for crate::http::HttpModule {
    fn module_name(&self) -> &'static str {
        "crate::http::HttpModule"
    }

    fn apply_services(&self, services: &mut ::wiregen::runtime::ServiceCollection) {
        services.apply_all(Self::__wiregen_registrations());
    }

    fn module_eq(&self, other: &dyn ::wiregen::runtime::DependencyModule) -> bool {
        ::wiregen::runtime::value_eq(self, other)
    }
}

#[doc = "Declares a dependency on `HttpModule`."]
pub struct HttpModuleDependency {
    pub port: u16,
    pub verbose: ::std::option::Option<bool>,
    pub timeout: ::std::option::Option<std::time::Duration>,
}

impl HttpModuleDependency {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            verbose: ::std::option::Option::None,
            timeout: ::std::option::Option::None,
        }
    }

    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = ::std::option::Option::Some(value);
        self
    }

    pub fn with_timeout(mut self, value: std::time::Duration) -> Self {
        self.timeout = ::std::option::Option::Some(value);
        self
    }

    #[allow(unused_mut)]
    pub fn into_module(self) -> crate::http::HttpModule {
        let mut module = crate::http::HttpModule::new(self.port);
        if let ::std::option::Option::Some(value) = self.verbose {
            module.verbose = value;
        }
        if let ::std::option::Option::Some(value) = self.timeout {
            module.timeout = value;
        }
        module
    }
}

impl ::std::convert::From<HttpModuleDependency> for ::wiregen::runtime::ModuleRef {
    fn from(marker: HttpModuleDependency) -> Self {
        ::wiregen::runtime::ModuleRef::module(marker.into_module())
    }
}

pub trait HttpModuleServiceCollectionExt {
    #[doc = "Adds `HttpModule` and every module it references."]
    fn add_http(&mut self, port: u16)
        -> ::std::result::Result<&mut Self, ::wiregen::runtime::ModuleError>;
}

impl HttpModuleServiceCollectionExt for ::wiregen::runtime::ServiceCollection {
    fn add_http(&mut self, port: u16)
        -> ::std::result::Result<&mut Self, ::wiregen::runtime::ModuleError>
    {
        ::wiregen::runtime::ServiceCollectionExt::add_module(self, crate::http::HttpModule::new(port))
    }
}
