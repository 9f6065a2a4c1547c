// @generated by wiregen. Do not edit by hand.
impl crate::ReportingModule {
    #[doc(hidden)]
    pub fn __wiregen_registrations() -> &'static [::wiregen::runtime::RegistrationOp] {
        static REGISTRATIONS: ::wiregen::__private::once_cell::sync::Lazy<
            ::std::vec::Vec<::wiregen::runtime::RegistrationOp>,
        > = ::wiregen::__private::once_cell::sync::Lazy::new(|| {
            ::std::vec![
                ::wiregen::runtime::RegistrationOp::AddStandard(
                    ::wiregen::runtime::ServiceRegistration::new(
                        ::wiregen::runtime::TypeKey::named("crate::Clock"),
                        ::wiregen::runtime::Implementation::Type(
                            ::wiregen::runtime::TypeKey::named("crate::Clock")
                        ),
                        ::wiregen::runtime::Lifetime::Transient,
                    )
                )
            ]
        });
        REGISTRATIONS.as_slice()
    }
}
