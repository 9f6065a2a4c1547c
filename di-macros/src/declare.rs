//! Declaration attributes: `#[module]`, `#[transient]`, `#[scoped]`, `#[singleton]`.
//!
//! The attributes carry no code of their own. They check their arguments so
//! mistakes surface at the declaration, then hand the item back unchanged;
//! the generator reads the same arguments from the sources.

use proc_macro::TokenStream;
use proc_macro2::{TokenStream as TokenStream2, TokenTree};
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Ident, Item, Token};

/// One `name`, `name = value` or `name(...)` argument.
struct Arg {
    name: Ident,
    value: ArgValue,
}

enum ArgValue {
    Flag,
    Assign(TokenStream2),
    List(TokenStream2),
}

impl Parse for Arg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name: Ident = input.parse()?;
        let value = if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            // Commas inside generic arguments do not end the value.
            let mut tokens = TokenStream2::new();
            let mut depth = 0usize;
            while !input.is_empty() && !(depth == 0 && input.peek(Token![,])) {
                let token: TokenTree = input.parse()?;
                if let TokenTree::Punct(punct) = &token {
                    match punct.as_char() {
                        '<' => depth += 1,
                        '>' => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                }
                tokens.extend([token]);
            }
            if tokens.is_empty() {
                return Err(input.error(format!("expected a value for `{}`", name)));
            }
            ArgValue::Assign(tokens)
        } else if input.peek(syn::token::Paren) {
            let content;
            syn::parenthesized!(content in input);
            ArgValue::List(content.parse()?)
        } else {
            ArgValue::Flag
        };
        Ok(Arg { name, value })
    }
}

fn parse_args(args: TokenStream) -> syn::Result<Vec<Arg>> {
    let args = syn::parse::Parser::parse(Punctuated::<Arg, Token![,]>::parse_terminated, args)?;
    Ok(args.into_iter().collect())
}

const REGISTRATION_TYPES: &[&str] = &[
    "add",
    "Add",
    "try",
    "Try",
    "try_add",
    "TryAdd",
    "try_enumerable",
    "TryEnumerable",
    "replace",
    "Replace",
];

fn check_registration(arg: &Arg) -> syn::Result<()> {
    let lit: syn::LitStr = assigned(arg)?;
    if REGISTRATION_TYPES.contains(&lit.value().as_str()) {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(
            lit,
            "expected one of \"add\", \"try\", \"try_enumerable\", \"replace\"",
        ))
    }
}

fn assigned<T: Parse>(arg: &Arg) -> syn::Result<T> {
    match &arg.value {
        ArgValue::Assign(tokens) => syn::parse2(tokens.clone()),
        _ => Err(syn::Error::new_spanned(
            &arg.name,
            format!("expected `{} = ...`", arg.name),
        )),
    }
}

fn flag_or_bool(arg: &Arg) -> syn::Result<()> {
    match &arg.value {
        ArgValue::Flag => Ok(()),
        _ => assigned::<syn::LitBool>(arg).map(|_| ()),
    }
}

fn flag(arg: &Arg) -> syn::Result<()> {
    match &arg.value {
        ArgValue::Flag => Ok(()),
        _ => Err(syn::Error::new_spanned(
            &arg.name,
            format!("`{}` takes no value", arg.name),
        )),
    }
}

fn type_list(arg: &Arg) -> syn::Result<()> {
    match &arg.value {
        ArgValue::List(tokens) => {
            syn::parse::Parser::parse2(
                Punctuated::<syn::Path, Token![,]>::parse_terminated,
                tokens.clone(),
            )?;
            Ok(())
        }
        _ => Err(syn::Error::new_spanned(
            &arg.name,
            format!("expected `{}(Type, ...)`", arg.name),
        )),
    }
}

/// `depends_on(A, B(arg, ..., prop = value))`.
struct Dependency;

impl Parse for Dependency {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        input.parse::<syn::Path>()?;
        if input.peek(syn::token::Paren) {
            let content;
            syn::parenthesized!(content in input);
            content.parse_terminated(syn::Expr::parse, Token![,])?;
        }
        Ok(Dependency)
    }
}

fn check_module_arg(arg: &Arg) -> syn::Result<()> {
    match arg.name.to_string().as_str() {
        "only_realm" | "auto_equality" | "configure" => flag(arg),
        "generate_attribute" => flag_or_bool(arg),
        "registration" => check_registration(arg),
        "use_method" => {
            let lit: syn::LitStr = assigned(arg)?;
            syn::parse_str::<Ident>(&lit.value())
                .map(|_| ())
                .map_err(|_| syn::Error::new_spanned(lit, "`use_method` must be a method name"))
        }
        "feature_order" => assigned::<syn::Expr>(arg).map(|_| ()),
        "features" | "handles" => type_list(arg),
        "depends_on" => match &arg.value {
            ArgValue::List(tokens) => {
                syn::parse::Parser::parse2(
                    Punctuated::<Dependency, Token![,]>::parse_terminated,
                    tokens.clone(),
                )?;
                Ok(())
            }
            _ => Err(syn::Error::new_spanned(
                &arg.name,
                "expected `depends_on(Module, ...)`",
            )),
        },
        other => Err(syn::Error::new_spanned(
            &arg.name,
            format!("unknown module argument `{}`", other),
        )),
    }
}

fn check_service_arg(arg: &Arg) -> syn::Result<()> {
    match arg.name.to_string().as_str() {
        "service" => assigned::<syn::Type>(arg).map(|_| ()),
        "realm" | "factory" => assigned::<syn::Path>(arg).map(|_| ()),
        "key" => assigned::<syn::LitStr>(arg).map(|_| ()),
        "registration" => check_registration(arg),
        "cross_wire" => flag(arg),
        other => Err(syn::Error::new_spanned(
            &arg.name,
            format!("unknown service argument `{}`", other),
        )),
    }
}

fn derives_partial_eq(item: &Item) -> bool {
    let attrs = match item {
        Item::Struct(item) => &item.attrs,
        Item::Enum(item) => &item.attrs,
        _ => return false,
    };
    attrs.iter().filter(|a| a.path().is_ident("derive")).any(|a| {
        a.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
            .map(|paths| {
                paths
                    .iter()
                    .any(|p| p.segments.last().is_some_and(|s| s.ident == "PartialEq"))
            })
            .unwrap_or(false)
    })
}

pub fn module_impl(args: TokenStream, item: TokenStream) -> TokenStream {
    let item = syn::parse_macro_input!(item as Item);
    let result = parse_args(args).and_then(|args| {
        if !matches!(item, Item::Struct(_)) {
            return Err(syn::Error::new_spanned(
                &item,
                "#[module] can only be applied to structs",
            ));
        }
        for arg in &args {
            check_module_arg(arg)?;
        }
        Ok(args.iter().any(|arg| arg.name == "auto_equality"))
    });

    match result {
        Ok(true) if !derives_partial_eq(&item) => quote! {
            #[derive(PartialEq)]
            #item
        }
        .into(),
        Ok(_) => quote!(#item).into(),
        Err(err) => {
            let err = err.to_compile_error();
            quote!(#err #item).into()
        }
    }
}

pub fn service_impl(kind: &str, args: TokenStream, item: TokenStream) -> TokenStream {
    let item = syn::parse_macro_input!(item as Item);
    let result = parse_args(args).and_then(|args| {
        if !matches!(item, Item::Struct(_) | Item::Enum(_)) {
            return Err(syn::Error::new_spanned(
                &item,
                format!("#[{}] can only be applied to structs and enums", kind),
            ));
        }
        args.iter().try_for_each(check_service_arg)
    });

    match result {
        Ok(()) => quote!(#item).into(),
        Err(err) => {
            let err = err.to_compile_error();
            quote!(#err #item).into()
        }
    }
}
