// @generated by wiregen. Do not edit by hand.
impl crate::http::HttpModule {
    #[doc(hidden)]
    pub fn __wiregen_registrations() -> &'static [::wiregen::runtime::RegistrationOp] {
        static REGISTRATIONS: ::wiregen::__private::once_cell::sync::Lazy<
            ::std::vec::Vec<::wiregen::runtime::RegistrationOp>,
        > = ::wiregen::__private::once_cell::sync::Lazy::new(|| {
            ::std::vec![
                ::wiregen::runtime::RegistrationOp::AddStandard(
                    ::wiregen::runtime::ServiceRegistration::new(
                        ::wiregen::runtime::TypeKey::named("crate::http::Router"),
                        ::wiregen::runtime::Implementation::Type(
                            ::wiregen::runtime::TypeKey::named("crate::http::Router")
                        ),
                        ::wiregen::runtime::Lifetime::Scoped,
                    )
                )
            ]
        });
        REGISTRATIONS.as_slice()
    }
}
