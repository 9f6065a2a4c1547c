//! Module façade units.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::naming::{dependency_name, extension_trait_name, module_file_name, REGISTRATIONS_FN};
use super::{runtime, GeneratedFile, Syntax};
use crate::error::GenError;
use crate::models::{ModuleDescriptor, ModuleReference, TypeName};

/// Renders the façade unit of a canonical module.
///
/// `has_registrations` tells whether a registrations unit exists for it.
pub fn render_module(
    module: &ModuleDescriptor,
    has_registrations: bool,
) -> Result<GeneratedFile, GenError> {
    let syntax = Syntax::new(module);
    let rt = runtime();
    let ty = syntax.type_path(&module.ty)?;
    let name = module.id();

    let mut items = Vec::new();
    if module.auto_generated {
        let ident = syntax.ident(&module.ty.name)?;
        items.push(quote! {
            /// Whole-program module collecting every module added in the entry point.
            #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct #ident;
        });
    }

    let references = module
        .references
        .iter()
        .map(|reference| construct_reference(&syntax, reference))
        .collect::<Result<Vec<_>, _>>()?;
    let referenced = (!references.is_empty()).then(|| {
        quote! {
            fn referenced_modules(&self) -> ::std::vec::Vec<#rt::ModuleRef> {
                ::std::vec![#(#rt::ModuleRef::module(#references)),*]
            }
        }
    });

    let extras = module
        .additional_modules
        .iter()
        .map(|extra| syntax.type_path(extra))
        .collect::<Result<Vec<_>, _>>()?;
    let extra = (!extras.is_empty()).then(|| {
        quote! {
            fn extra_modules(&self) -> ::std::vec::Vec<#rt::ModuleRef> {
                ::std::vec![#(#rt::ModuleRef::module(<#extras as ::std::default::Default>::default())),*]
            }
        }
    });

    let apply = if has_registrations {
        let registrations = format_ident!("{}", REGISTRATIONS_FN);
        quote! {
            fn apply_services(&self, services: &mut #rt::ServiceCollection) {
                services.apply_all(Self::#registrations());
            }
        }
    } else {
        quote! {
            fn apply_services(&self, _services: &mut #rt::ServiceCollection) {}
        }
    };

    let configure = module.configure.then(|| {
        quote! {
            fn configure(&self, services: &mut #rt::ServiceCollection) {
                <Self as #rt::ConfigureServices>::configure(self, services);
            }
        }
    });

    let equality = module.auto_equality.then(|| {
        quote! {
            fn module_eq(&self, other: &dyn #rt::DependencyModule) -> bool {
                #rt::value_eq(self, other)
            }
        }
    });

    let features = feature_keys(&module.features);
    let provided = (!module.features.is_empty()).then(|| {
        let order = module.feature_order;
        quote! {
            fn provided_features(&self) -> ::std::vec::Vec<#rt::TypeKey> {
                ::std::vec![#(#rt::TypeKey::named(#features)),*]
            }

            fn feature_order(&self) -> i32 {
                #order
            }
        }
    });

    let handles = feature_keys(&module.handles);
    let handled = (!module.handles.is_empty()).then(|| {
        quote! {
            fn handled_features(&self) -> ::std::vec::Vec<#rt::TypeKey> {
                ::std::vec![#(#rt::TypeKey::named(#handles)),*]
            }

            fn handle_feature(
                &self,
                feature: &#rt::TypeKey,
                providers: &[::std::sync::Arc<dyn #rt::DependencyModule>],
                services: &mut #rt::ServiceCollection,
            ) {
                <Self as #rt::FeatureHandler>::handle_feature(self, feature, providers, services);
            }
        }
    });

    items.push(quote! {
        impl #rt::DependencyModule for #ty {
            fn module_name(&self) -> &'static str {
                #name
            }

            #referenced
            #extra
            #apply
            #configure
            #equality
            #provided
            #handled
        }
    });

    if module.generate_attribute {
        items.push(companion_marker(&syntax, module, &ty)?);
    }
    if let Some(method) = &module.use_method {
        items.push(extension_trait(&syntax, module, &ty, method)?);
    }

    Ok(GeneratedFile::render(
        module_file_name(&module.ty),
        quote!(#(#items)*),
    ))
}

fn feature_keys(features: &[TypeName]) -> Vec<String> {
    features.iter().map(TypeName::key).collect()
}

/// Expression constructing a referenced module.
///
/// Positional arguments go to `new`; a bare reference uses `Default`.
/// Property overrides are assigned on the constructed value.
fn construct_reference(
    syntax: &Syntax<'_>,
    reference: &ModuleReference,
) -> Result<TokenStream, GenError> {
    let ty = syntax.type_path(&reference.module)?;
    let base = if reference.arguments.is_empty() {
        quote!(<#ty as ::std::default::Default>::default())
    } else {
        let arguments = reference
            .arguments
            .iter()
            .map(|argument| syntax.expr(argument))
            .collect::<Result<Vec<_>, _>>()?;
        quote!(#ty::new(#(#arguments),*))
    };

    if reference.properties.is_empty() {
        return Ok(base);
    }
    let assignments = reference
        .properties
        .iter()
        .map(|property| {
            let name = syntax.ident(&property.name)?;
            let value = syntax.expr(&property.value)?;
            Ok(quote!(module.#name = #value;))
        })
        .collect::<Result<Vec<_>, GenError>>()?;
    Ok(quote! {
        {
            let mut module = #base;
            #(#assignments)*
            module
        }
    })
}

/// `<Name>Dependency`: a value naming this module with its constructor
/// arguments and optional property values, convertible to a `ModuleRef`.
fn companion_marker(
    syntax: &Syntax<'_>,
    module: &ModuleDescriptor,
    ty: &syn::Path,
) -> Result<TokenStream, GenError> {
    let rt = runtime();
    let marker = syntax.ident(&dependency_name(&module.ty))?;
    let doc = format!("Declares a dependency on `{}`.", module.ty.name);

    let params = module
        .constructor
        .iter()
        .map(|p| Ok((syntax.ident(&p.name)?, syntax.ty(&p.ty)?)))
        .collect::<Result<Vec<_>, GenError>>()?;
    let props = module
        .properties
        .iter()
        .map(|p| Ok((syntax.ident(&p.name)?, syntax.ty(&p.ty)?)))
        .collect::<Result<Vec<_>, GenError>>()?;

    let param_names: Vec<_> = params.iter().map(|(name, _)| name).collect();
    let param_types: Vec<_> = params.iter().map(|(_, ty)| ty).collect();
    let prop_names: Vec<_> = props.iter().map(|(name, _)| name).collect();
    let prop_types: Vec<_> = props.iter().map(|(_, ty)| ty).collect();
    let setters: Vec<_> = prop_names
        .iter()
        .map(|name| format_ident!("with_{}", name))
        .collect();

    let construct = if params.is_empty() {
        quote!(<#ty as ::std::default::Default>::default())
    } else {
        quote!(#ty::new(#(self.#param_names),*))
    };

    Ok(quote! {
        #[doc = #doc]
        pub struct #marker {
            #(pub #param_names: #param_types,)*
            #(pub #prop_names: ::std::option::Option<#prop_types>,)*
        }

        impl #marker {
            pub fn new(#(#param_names: #param_types),*) -> Self {
                Self {
                    #(#param_names,)*
                    #(#prop_names: ::std::option::Option::None,)*
                }
            }

            #(
                pub fn #setters(mut self, value: #prop_types) -> Self {
                    self.#prop_names = ::std::option::Option::Some(value);
                    self
                }
            )*

            #[allow(unused_mut)]
            pub fn into_module(self) -> #ty {
                let mut module = #construct;
                #(
                    if let ::std::option::Option::Some(value) = self.#prop_names {
                        module.#prop_names = value;
                    }
                )*
                module
            }
        }

        impl ::std::convert::From<#marker> for #rt::ModuleRef {
            fn from(marker: #marker) -> Self {
                #rt::ModuleRef::module(marker.into_module())
            }
        }
    })
}

/// `<Name>ServiceCollectionExt`: adds the module to a collection by name.
fn extension_trait(
    syntax: &Syntax<'_>,
    module: &ModuleDescriptor,
    ty: &syn::Path,
    method: &str,
) -> Result<TokenStream, GenError> {
    let rt = runtime();
    let trait_name = syntax.ident(&extension_trait_name(&module.ty))?;
    let method = syntax.ident(method)?;
    let doc = format!("Adds `{}` and every module it references.", module.ty.name);

    let params = module
        .constructor
        .iter()
        .map(|p| Ok((syntax.ident(&p.name)?, syntax.ty(&p.ty)?)))
        .collect::<Result<Vec<_>, GenError>>()?;
    let names: Vec<_> = params.iter().map(|(name, _)| name).collect();
    let types: Vec<_> = params.iter().map(|(_, ty)| ty).collect();

    let construct = if params.is_empty() {
        quote!(<#ty as ::std::default::Default>::default())
    } else {
        quote!(#ty::new(#(#names),*))
    };

    Ok(quote! {
        pub trait #trait_name {
            #[doc = #doc]
            fn #method(&mut self, #(#names: #types),*)
                -> ::std::result::Result<&mut Self, #rt::ModuleError>;
        }

        impl #trait_name for #rt::ServiceCollection {
            fn #method(&mut self, #(#names: #types),*)
                -> ::std::result::Result<&mut Self, #rt::ModuleError>
            {
                #rt::ServiceCollectionExt::add_module(self, #construct)
            }
        }
    })
}
