//! Registration units: the ordered container operations of a module plus
//! the glue wrappers its factories need.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::naming::{registrations_file_name, REGISTRATIONS_FN};
use super::{runtime, GeneratedFile, Syntax};
use crate::error::GenError;
use crate::models::{FactoryMethod, Lifetime, ModuleDescriptor, ParameterSource, RegistrationType};
use crate::runtime::{FactoryRef, Implementation, RegistrationOp, ServiceRegistration, TypeKey};
use crate::services::ResolvedModule;

/// Renders the registrations unit of a module.
///
/// `ops` must come from `emit_registrations` on `resolved`; each operation
/// is rendered as the expression that rebuilds it, inside a lazily
/// initialized static.
pub fn render_registrations(
    module: &ModuleDescriptor,
    resolved: &ResolvedModule,
    ops: &[RegistrationOp],
) -> Result<GeneratedFile, GenError> {
    let syntax = Syntax::new(module);
    let rt = runtime();
    let ty = syntax.type_path(&module.ty)?;
    let registrations_fn = format_ident!("{}", REGISTRATIONS_FN);

    let ops = ops
        .iter()
        .map(|op| render_op(&syntax, &ty, resolved, op))
        .collect::<Result<Vec<_>, _>>()?;
    let glue = resolved
        .glue_factories
        .iter()
        .map(|factory| render_glue(&syntax, factory))
        .collect::<Result<Vec<_>, _>>()?;

    let tokens = quote! {
        impl #ty {
            #[doc(hidden)]
            pub fn #registrations_fn() -> &'static [#rt::RegistrationOp] {
                static REGISTRATIONS: ::wiregen::__private::once_cell::sync::Lazy<
                    ::std::vec::Vec<#rt::RegistrationOp>,
                > = ::wiregen::__private::once_cell::sync::Lazy::new(|| {
                    ::std::vec![#(#ops),*]
                });
                REGISTRATIONS.as_slice()
            }

            #(#glue)*
        }
    };

    Ok(GeneratedFile::render(registrations_file_name(&module.ty), tokens))
}

fn render_op(
    syntax: &Syntax<'_>,
    owner: &syn::Path,
    resolved: &ResolvedModule,
    op: &RegistrationOp,
) -> Result<TokenStream, GenError> {
    let rt = runtime();
    Ok(match op {
        RegistrationOp::AddStandard(r) => {
            let r = render_registration(syntax, owner, resolved, r)?;
            quote!(#rt::RegistrationOp::AddStandard(#r))
        }
        RegistrationOp::AddKeyed(r) => {
            let r = render_registration(syntax, owner, resolved, r)?;
            quote!(#rt::RegistrationOp::AddKeyed(#r))
        }
        RegistrationOp::TryAdd(r) => {
            let r = render_registration(syntax, owner, resolved, r)?;
            quote!(#rt::RegistrationOp::TryAdd(#r))
        }
        RegistrationOp::TryAddEnumerable(r) => {
            let r = render_registration(syntax, owner, resolved, r)?;
            quote!(#rt::RegistrationOp::TryAddEnumerable(#r))
        }
        RegistrationOp::Replace(r) => {
            let r = render_registration(syntax, owner, resolved, r)?;
            quote!(#rt::RegistrationOp::Replace(#r))
        }
        RegistrationOp::CrossWire {
            registration,
            interfaces,
            verb,
        } => {
            let registration = render_registration(syntax, owner, resolved, registration)?;
            let interfaces = interfaces.iter().map(render_key);
            let verb = verb_tokens(*verb);
            quote! {
                #rt::RegistrationOp::CrossWire {
                    registration: #registration,
                    interfaces: ::std::vec![#(#interfaces),*],
                    verb: #verb,
                }
            }
        }
    })
}

fn render_key(key: &TypeKey) -> TokenStream {
    let rt = runtime();
    let name = key.as_str();
    quote!(#rt::TypeKey::named(#name))
}

fn verb_tokens(verb: RegistrationType) -> TokenStream {
    let rt = runtime();
    match verb {
        RegistrationType::Add => quote!(#rt::RegistrationType::Add),
        RegistrationType::Try => quote!(#rt::RegistrationType::Try),
        RegistrationType::TryEnumerable => quote!(#rt::RegistrationType::TryEnumerable),
        RegistrationType::Replace => quote!(#rt::RegistrationType::Replace),
    }
}

fn lifetime_tokens(lifetime: Lifetime) -> TokenStream {
    let rt = runtime();
    match lifetime {
        Lifetime::Transient => quote!(#rt::Lifetime::Transient),
        Lifetime::Scoped => quote!(#rt::Lifetime::Scoped),
        Lifetime::Singleton => quote!(#rt::Lifetime::Singleton),
    }
}

fn render_registration(
    syntax: &Syntax<'_>,
    owner: &syn::Path,
    resolved: &ResolvedModule,
    registration: &ServiceRegistration,
) -> Result<TokenStream, GenError> {
    let rt = runtime();
    let service = render_key(&registration.service);
    let implementation = match &registration.implementation {
        Implementation::Type(key) => {
            let key = render_key(key);
            quote!(#rt::Implementation::Type(#key))
        }
        Implementation::Forward(key) => {
            let key = render_key(key);
            quote!(#rt::Implementation::Forward(#key))
        }
        Implementation::Factory(factory) => render_factory(syntax, owner, resolved, factory)?,
    };
    let lifetime = lifetime_tokens(registration.lifetime);
    let key = registration.key.as_deref().map(|key| quote!(.with_key(#key)));

    Ok(quote! {
        #rt::ServiceRegistration::new(
            #service,
            #implementation,
            #lifetime,
        )#key
    })
}

/// A factory reference carrying the callable the container invokes.
///
/// Glue wrappers live next to the registrations and are named through the
/// module type, since `Self` is not available inside the static
/// initializer. Container-only factories are referenced by their own path.
fn render_factory(
    syntax: &Syntax<'_>,
    owner: &syn::Path,
    resolved: &ResolvedModule,
    factory: &FactoryRef,
) -> Result<TokenStream, GenError> {
    let rt = runtime();
    let name = factory.name();
    let callable = if resolved
        .glue_factories
        .iter()
        .any(|glue| glue.glue_name() == name)
    {
        let glue = syntax.ident(name)?;
        quote!(#owner::#glue)
    } else {
        let path = syntax.path(name)?;
        quote!(#path)
    };
    Ok(quote!(#rt::Implementation::Factory(#rt::FactoryRef::new(#name, #callable))))
}

/// Wrapper resolving each factory parameter from the container.
fn render_glue(syntax: &Syntax<'_>, factory: &FactoryMethod) -> Result<TokenStream, GenError> {
    let rt = runtime();
    let glue = syntax.ident(&factory.glue_name())?;
    let path = syntax.path(&factory.path)?;

    let arguments = factory
        .parameters
        .iter()
        .map(|parameter| {
            Ok(match &parameter.source {
                ParameterSource::Container => quote!(resolver),
                ParameterSource::Shared { ty, service } => {
                    let ty = syntax.ty(ty)?;
                    let key = service.key();
                    quote!(resolver.require::<#ty>(&#rt::TypeKey::named(#key))?)
                }
                ParameterSource::Cloned { ty, service } => {
                    let ty = syntax.ty(ty)?;
                    let key = service.key();
                    quote! {
                        ::std::clone::Clone::clone(
                            &*resolver.require::<#ty>(&#rt::TypeKey::named(#key))?
                        )
                    }
                }
            })
        })
        .collect::<Result<Vec<_>, GenError>>()?;

    Ok(quote! {
        #[doc(hidden)]
        fn #glue(
            resolver: &dyn #rt::ServiceResolver,
        ) -> ::std::result::Result<#rt::Instance, #rt::ResolveError> {
            ::std::result::Result::Ok(#rt::instance(::std::sync::Arc::new(#path(#(#arguments),*))))
        }
    })
}
