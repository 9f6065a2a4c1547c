// @generated by wiregen. Do not edit by hand.
impl crate::AppModule {
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
                ),
                ::wiregen::runtime::RegistrationOp::CrossWire {
                    registration: ::wiregen::runtime::ServiceRegistration::new(
                        ::wiregen::runtime::TypeKey::named("crate::greet::English"),
                        ::wiregen::runtime::Implementation::Type(
                            ::wiregen::runtime::TypeKey::named("crate::greet::English")
                        ),
                        ::wiregen::runtime::Lifetime::Singleton,
                    ),
                    interfaces: ::std::vec![
                        ::wiregen::runtime::TypeKey::named("crate::greet::Greeter"),
                        ::wiregen::runtime::TypeKey::named("crate::greet::Farewell")
                    ],
                    verb: ::wiregen::runtime::RegistrationType::Add,
                },
                ::wiregen::runtime::RegistrationOp::AddKeyed(
                    ::wiregen::runtime::ServiceRegistration::new(
                        ::wiregen::runtime::TypeKey::named("crate::greet::Greeter"),
                        ::wiregen::runtime::Implementation::Type(
                            ::wiregen::runtime::TypeKey::named("crate::greet::French")
                        ),
                        ::wiregen::runtime::Lifetime::Transient,
                    )
                    .with_key("fr")
                ),
                ::wiregen::runtime::RegistrationOp::AddStandard(
                    ::wiregen::runtime::ServiceRegistration::new(
                        ::wiregen::runtime::TypeKey::named("crate::mail::SmtpMailer"),
                        ::wiregen::runtime::Implementation::Factory(
                            ::wiregen::runtime::FactoryRef::new(
                                "__wiregen_glue_mail_smtpmailer_create",
                                crate::AppModule::__wiregen_glue_mail_smtpmailer_create
                            )
                        ),
                        ::wiregen::runtime::Lifetime::Singleton,
                    )
                )
            ]
        });
        REGISTRATIONS.as_slice()
    }

    #[doc(hidden)]
    fn __wiregen_glue_mail_smtpmailer_create(
        resolver: &dyn ::wiregen::runtime::ServiceResolver,
    ) -> ::std::result::Result<::wiregen::runtime::Instance, ::wiregen::runtime::ResolveError> {
        ::std::result::Result::Ok(::wiregen::runtime::instance(::std::sync::Arc::new(
            crate::mail::SmtpMailer::create(
                resolver.require::<crate::config::Settings>(
                    &::wiregen::runtime::TypeKey::named("crate::config::Settings")
                )?,
                ::std::clone::Clone::clone(
                    &*resolver.require::<u32>(&::wiregen::runtime::TypeKey::named("u32"))?
                )
            )
        )))
    }
}
