//! Parsing of `#[module(...)]` and service attribute arguments.
//!
//! Arguments are parsed into unresolved syntax (`syn::Path`, expressions);
//! the scanner resolves paths against the scope of the annotated item.

use quote::ToTokens;
use syn::meta::ParseNestedMeta;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, Ident, LitBool, LitStr, Token};

use crate::models::{Lifetime, RegistrationType};

/// Crate prefixes under which the attributes are recognized.
const ATTRIBUTE_CRATES: &[&str] = &["wiregen", "di_macros"];

/// Which declaration attribute an attribute is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    Module,
    Service(Lifetime),
    /// `wiregen::<name>` with a name that is not a known attribute.
    Unknown(String),
}

/// Classifies an attribute, returning `None` for unrelated attributes.
pub fn attribute_kind(attr: &Attribute) -> Option<AttributeKind> {
    let segments: Vec<String> = attr
        .path()
        .segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect();
    let (prefixed, name) = match segments.as_slice() {
        [name] => (false, name.as_str()),
        [krate, name] if ATTRIBUTE_CRATES.contains(&krate.as_str()) => (true, name.as_str()),
        _ => return None,
    };
    if name == "module" {
        return Some(AttributeKind::Module);
    }
    match name.parse::<Lifetime>() {
        Ok(lifetime) if Lifetime::ATTRIBUTES.contains(&name) => {
            Some(AttributeKind::Service(lifetime))
        }
        _ if prefixed && !matches!(name, "Context" | "FromContext") => {
            Some(AttributeKind::Unknown(name.to_string()))
        }
        _ => None,
    }
}

/// One argument of a parameterized module reference.
#[derive(Debug, Clone)]
pub enum ReferenceArgument {
    Positional(Expr),
    Property(Ident, Expr),
}

impl Parse for ReferenceArgument {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(Ident) && input.peek2(Token![=]) && !input.peek2(Token![==]) {
            let name: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            Ok(ReferenceArgument::Property(name, input.parse()?))
        } else {
            Ok(ReferenceArgument::Positional(input.parse()?))
        }
    }
}

/// A `depends_on(...)` entry.
#[derive(Debug, Clone)]
pub struct RawReference {
    pub path: syn::Path,
    pub arguments: Vec<ReferenceArgument>,
}

/// Arguments of `#[module(...)]`.
#[derive(Debug, Clone, Default)]
pub struct ModuleArgs {
    pub only_realm: bool,
    pub registration: Option<RegistrationType>,
    pub generate_attribute: Option<bool>,
    pub use_method: Option<String>,
    pub auto_equality: bool,
    pub configure: bool,
    pub features: Vec<syn::Path>,
    pub feature_order: i32,
    pub handles: Vec<syn::Path>,
    pub depends_on: Vec<RawReference>,
}

impl ModuleArgs {
    pub fn parse(attr: &Attribute) -> syn::Result<Self> {
        let mut args = ModuleArgs::default();
        if matches!(attr.meta, syn::Meta::Path(_)) {
            return Ok(args);
        }
        attr.parse_nested_meta(|meta| {
            let name = meta_name(&meta)?;
            match name.as_str() {
                "only_realm" => args.only_realm = parse_flag(&meta)?,
                "registration" => args.registration = Some(parse_registration(&meta)?),
                "generate_attribute" => args.generate_attribute = Some(parse_flag(&meta)?),
                "use_method" => {
                    let lit: LitStr = meta.value()?.parse()?;
                    let method = lit.value();
                    if syn::parse_str::<Ident>(&method).is_err() {
                        return Err(syn::Error::new(
                            lit.span(),
                            format!("use_method '{}' is not a valid method name", method),
                        ));
                    }
                    args.use_method = Some(method);
                }
                "auto_equality" => args.auto_equality = parse_flag(&meta)?,
                "configure" => args.configure = parse_flag(&meta)?,
                "features" => args.features = parse_path_list(&meta)?,
                "handles" => args.handles = parse_path_list(&meta)?,
                "feature_order" => args.feature_order = parse_i32(&meta)?,
                "depends_on" => {
                    meta.parse_nested_meta(|dependency| {
                        let mut reference = RawReference {
                            path: dependency.path.clone(),
                            arguments: Vec::new(),
                        };
                        if dependency.input.peek(syn::token::Paren) {
                            let content;
                            syn::parenthesized!(content in dependency.input);
                            let parsed =
                                Punctuated::<ReferenceArgument, Token![,]>::parse_terminated(
                                    &content,
                                )?;
                            reference.arguments = parsed.into_iter().collect();
                        }
                        args.depends_on.push(reference);
                        Ok(())
                    })?;
                }
                other => {
                    return Err(meta.error(format!("unknown module argument '{}'", other)));
                }
            }
            Ok(())
        })?;
        Ok(args)
    }
}

/// Arguments of `#[transient]`, `#[scoped]` and `#[singleton]`.
#[derive(Debug, Clone, Default)]
pub struct ServiceArgs {
    pub service: Option<syn::Path>,
    pub realm: Option<syn::Path>,
    pub key: Option<String>,
    pub registration: Option<RegistrationType>,
    pub cross_wire: bool,
    pub factory: Option<syn::Path>,
}

impl ServiceArgs {
    pub fn parse(attr: &Attribute) -> syn::Result<Self> {
        let mut args = ServiceArgs::default();
        if matches!(attr.meta, syn::Meta::Path(_)) {
            return Ok(args);
        }
        attr.parse_nested_meta(|meta| {
            let name = meta_name(&meta)?;
            match name.as_str() {
                "service" => {
                    let ty: syn::Type = meta.value()?.parse()?;
                    args.service = Some(type_path(&ty).ok_or_else(|| {
                        syn::Error::new_spanned(&ty, "service must name a type or trait")
                    })?);
                }
                "realm" => args.realm = Some(meta.value()?.parse()?),
                "key" => {
                    let lit: LitStr = meta.value()?.parse()?;
                    args.key = Some(lit.value());
                }
                "registration" => args.registration = Some(parse_registration(&meta)?),
                "cross_wire" => args.cross_wire = parse_flag(&meta)?,
                "factory" => args.factory = Some(meta.value()?.parse()?),
                other => {
                    return Err(meta.error(format!("unknown service argument '{}'", other)));
                }
            }
            Ok(())
        })?;
        Ok(args)
    }
}

/// The path a type refers to: a named type or the first bound of a trait object.
pub fn type_path(ty: &syn::Type) -> Option<syn::Path> {
    match ty {
        syn::Type::Path(path) => Some(path.path.clone()),
        syn::Type::TraitObject(object) => object.bounds.iter().find_map(|bound| match bound {
            syn::TypeParamBound::Trait(t) => Some(t.path.clone()),
            _ => None,
        }),
        syn::Type::Paren(inner) => type_path(&inner.elem),
        syn::Type::Group(inner) => type_path(&inner.elem),
        _ => None,
    }
}

/// Number of `_` generic arguments on the last segment of a path.
///
/// Concrete generic arguments are rejected.
pub fn open_generic_arity(path: &syn::Path) -> syn::Result<usize> {
    let Some(last) = path.segments.last() else {
        return Ok(0);
    };
    match &last.arguments {
        syn::PathArguments::None => Ok(0),
        syn::PathArguments::AngleBracketed(args) => {
            for arg in &args.args {
                if !matches!(arg, syn::GenericArgument::Type(syn::Type::Infer(_))) {
                    return Err(syn::Error::new_spanned(
                        arg,
                        "generic arguments of a service type must be `_`",
                    ));
                }
            }
            Ok(args.args.len())
        }
        syn::PathArguments::Parenthesized(args) => Err(syn::Error::new_spanned(
            args,
            "unsupported generic arguments",
        )),
    }
}

/// Token text of a syntax node.
pub fn token_text(node: &impl ToTokens) -> String {
    node.to_token_stream().to_string()
}

fn meta_name(meta: &ParseNestedMeta) -> syn::Result<String> {
    meta.path
        .get_ident()
        .map(Ident::to_string)
        .ok_or_else(|| meta.error("expected an argument name"))
}

/// `name` or `name = bool`.
fn parse_flag(meta: &ParseNestedMeta) -> syn::Result<bool> {
    if meta.input.peek(Token![=]) {
        let lit: LitBool = meta.value()?.parse()?;
        Ok(lit.value)
    } else {
        Ok(true)
    }
}

fn parse_registration(meta: &ParseNestedMeta) -> syn::Result<RegistrationType> {
    let lit: LitStr = meta.value()?.parse()?;
    lit.value()
        .parse()
        .map_err(|message: String| syn::Error::new(lit.span(), message))
}

fn parse_path_list(meta: &ParseNestedMeta) -> syn::Result<Vec<syn::Path>> {
    let mut paths = Vec::new();
    meta.parse_nested_meta(|inner| {
        paths.push(inner.path.clone());
        Ok(())
    })?;
    Ok(paths)
}

fn parse_i32(meta: &ParseNestedMeta) -> syn::Result<i32> {
    let expr: Expr = meta.value()?.parse()?;
    let (negative, literal) = match &expr {
        Expr::Unary(unary) if matches!(unary.op, syn::UnOp::Neg(_)) => (true, &*unary.expr),
        other => (false, other),
    };
    match literal {
        Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Int(int),
            ..
        }) => {
            let value: i32 = int.base10_parse()?;
            Ok(if negative { -value } else { value })
        }
        _ => Err(syn::Error::new_spanned(&expr, "expected an integer")),
    }
}
