//! Implementation of #[derive(FromContext)] proc-macro.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields};

pub fn derive_from_context_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let context_type = context_type(input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "FromContext can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "FromContext can only be derived for structs",
            ))
        }
    };

    let field_inits = fields
        .iter()
        .map(|field| {
            let field_name = &field.ident;
            let field_type = &field.ty;
            if is_default(field)? {
                Ok(quote! {
                    #field_name: <#field_type as ::std::default::Default>::default()
                })
            } else {
                Ok(quote! {
                    #field_name: <#field_type as crate::FromRef<#context_type>>::from_ref(ctx)
                })
            }
        })
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl #impl_generics crate::FromRef<#context_type> for #name #ty_generics #where_clause {
            fn from_ref(ctx: &#context_type) -> Self {
                Self {
                    #(#field_inits),*
                }
            }
        }
    })
}

/// `#[from_context(Context = MyContext)]` or `#[from_context(Context = "MyContext")]`.
fn context_type(input: &DeriveInput) -> syn::Result<syn::Type> {
    let mut context_ty: Option<syn::Type> = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("from_context") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("Context") {
                let value = meta.value()?;
                context_ty = Some(if value.peek(syn::LitStr) {
                    value.parse::<syn::LitStr>()?.parse()?
                } else {
                    value.parse()?
                });
                Ok(())
            } else {
                Err(meta.error("expected `Context = Type`"))
            }
        })?;
    }
    // Default to `Context`
    Ok(context_ty.unwrap_or_else(|| syn::parse_quote!(Context)))
}

/// Fields marked `#[from_context(default)]` are built with `Default`
/// instead of being resolved from the context.
fn is_default(field: &Field) -> syn::Result<bool> {
    let mut default = false;
    for attr in &field.attrs {
        if !attr.path().is_ident("from_context") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                default = true;
                Ok(())
            } else {
                Err(meta.error("expected `default`"))
            }
        })?;
    }
    Ok(default)
}
