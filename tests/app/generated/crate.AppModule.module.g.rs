// @generated by wiregen. Do not edit by hand.
impl ::wiregen::runtime::DependencyModule for crate::AppModule {
    fn module_name(&self) -> &'static str {
        "crate::AppModule"
    }

    fn referenced_modules(&self) -> ::std::vec::Vec<::wiregen::runtime::ModuleRef> {
        ::std::vec![::wiregen::runtime::ModuleRef::module({
            let mut module = crate::http::HttpModule::new(8080);
            module.verbose = true;
            module
        })]
    }

    fn apply_services(&self, services: &mut ::wiregen::runtime::ServiceCollection) {
        services.apply_all(Self::__wiregen_registrations());
    }
}
