// @generated by wiregen. Do not edit by hand.
impl ::wiregen::runtime::DependencyModule for crate::ReportingModule {
    fn module_name(&self) -> &'static str {
        "crate::ReportingModule"
    }

    fn apply_services(&self, services: &mut ::wiregen::runtime::ServiceCollection) {
        services.apply_all(Self::__wiregen_registrations());
    }
}
