//! Per-file syntax facts collected with a `syn` visitor.
//!
//! Collection is purely syntactic; path resolution happens afterwards when
//! every file's scopes are known.

use std::path::{Path, PathBuf};

use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{Attribute, Expr, Fields, FnArg, Pat, ReturnType};

use super::attributes::{attribute_kind, type_path, AttributeKind};
use super::namespace::{is_public, Scope};

/// 1-indexed source line of a span.
pub fn line_of(span: proc_macro2::Span) -> usize {
    span.start().line
}

/// A declaration attribute found on an item.
#[derive(Debug, Clone)]
pub struct FoundAttribute {
    pub kind: AttributeKind,
    pub attr: Attribute,
    pub line: usize,
}

/// A named field of an annotated struct.
#[derive(Debug, Clone)]
pub struct FieldFacts {
    pub name: String,
    pub public: bool,
    pub ty: syn::Type,
}

/// A struct or enum carrying at least one declaration attribute.
#[derive(Debug, Clone)]
pub struct DeclaredItem {
    pub scope: usize,
    pub ident: String,
    pub line: usize,
    /// Number of type parameters.
    pub type_params: usize,
    pub fields: Vec<FieldFacts>,
    pub attributes: Vec<FoundAttribute>,
}

/// `impl Trait for Type`.
#[derive(Debug, Clone)]
pub struct TraitImpl {
    pub scope: usize,
    pub self_ty: syn::Path,
    pub trait_path: syn::Path,
}

/// A free function or an associated function of an inherent impl.
#[derive(Debug, Clone)]
pub struct FnFacts {
    pub scope: usize,
    /// Self type of the inherent impl, `None` for free functions.
    pub owner: Option<syn::Path>,
    pub name: String,
    pub line: usize,
    pub has_receiver: bool,
    pub returns_self: bool,
    pub inputs: Vec<(String, syn::Type)>,
    /// Declared return type, `None` for `()`.
    pub output: Option<syn::Type>,
}

/// A module type added to a collection from program code.
#[derive(Debug, Clone)]
pub struct ModuleCall {
    pub scope: usize,
    pub module: syn::Path,
}

/// Everything discovery needs from one source file.
#[derive(Debug, Clone)]
pub struct FileFacts {
    pub path: PathBuf,
    /// Scope 0 is the file itself; inline modules add more.
    pub scopes: Vec<Scope>,
    pub items: Vec<DeclaredItem>,
    pub trait_impls: Vec<TraitImpl>,
    pub functions: Vec<FnFacts>,
    /// Declaration attributes on items that cannot carry them: `(line, name)`.
    pub misplaced: Vec<(usize, String)>,
    /// Namespaces of `mod name;` declarations.
    pub declared_modules: Vec<String>,
    pub has_main: bool,
    pub module_calls: Vec<ModuleCall>,
}

impl FileFacts {
    /// Collects the facts of a parsed file living in `namespace`.
    pub fn collect(path: &Path, namespace: &str, file: &syn::File) -> Self {
        let mut facts = FileFacts {
            path: path.to_path_buf(),
            scopes: vec![Scope::new(namespace)],
            items: Vec::new(),
            trait_impls: Vec::new(),
            functions: Vec::new(),
            misplaced: Vec::new(),
            declared_modules: Vec::new(),
            has_main: false,
            module_calls: Vec::new(),
        };
        let mut collector = Collector {
            facts: &mut facts,
            stack: vec![0],
        };
        collector.visit_file(file);
        facts
    }

    pub fn scope(&self, index: usize) -> &Scope {
        &self.scopes[index]
    }
}

struct Collector<'f> {
    facts: &'f mut FileFacts,
    stack: Vec<usize>,
}

impl Collector<'_> {
    fn current(&self) -> usize {
        self.stack.last().copied().unwrap_or(0)
    }

    fn found(attrs: &[Attribute]) -> Vec<FoundAttribute> {
        attrs
            .iter()
            .filter_map(|attr| {
                attribute_kind(attr).map(|kind| FoundAttribute {
                    kind,
                    attr: attr.clone(),
                    line: line_of(attr.span()),
                })
            })
            .collect()
    }

    fn check_misplaced(&mut self, attrs: &[Attribute]) {
        for found in Self::found(attrs) {
            let name = match found.kind {
                AttributeKind::Module => "module".to_string(),
                AttributeKind::Service(lifetime) => lifetime.attribute_name().to_string(),
                AttributeKind::Unknown(name) => name,
            };
            self.facts.misplaced.push((found.line, name));
        }
    }

    fn declare(
        &mut self,
        attrs: &[Attribute],
        ident: &syn::Ident,
        generics: &syn::Generics,
        fields: Vec<FieldFacts>,
    ) {
        let attributes = Self::found(attrs);
        if attributes.is_empty() {
            return;
        }
        self.facts.items.push(DeclaredItem {
            scope: self.current(),
            ident: ident.to_string(),
            line: line_of(ident.span()),
            type_params: generics.type_params().count(),
            fields,
            attributes,
        });
    }

    fn function(&mut self, owner: Option<syn::Path>, sig: &syn::Signature) -> FnFacts {
        let mut has_receiver = false;
        let mut inputs = Vec::new();
        for (i, input) in sig.inputs.iter().enumerate() {
            match input {
                FnArg::Receiver(_) => has_receiver = true,
                FnArg::Typed(typed) => {
                    let name = match &*typed.pat {
                        Pat::Ident(ident) => ident.ident.to_string(),
                        _ => format!("arg{}", i),
                    };
                    inputs.push((name, (*typed.ty).clone()));
                }
            }
        }
        let returns_self = match &sig.output {
            ReturnType::Type(_, ty) => match type_path(ty) {
                Some(path) => {
                    path.is_ident("Self")
                        || owner
                            .as_ref()
                            .and_then(|o| o.segments.last())
                            .zip(path.segments.last())
                            .is_some_and(|(a, b)| a.ident == b.ident)
                }
                None => false,
            },
            ReturnType::Default => false,
        };
        FnFacts {
            scope: self.current(),
            owner,
            name: sig.ident.to_string(),
            line: line_of(sig.ident.span()),
            has_receiver,
            returns_self,
            inputs,
            output: match &sig.output {
                ReturnType::Type(_, ty) => Some((**ty).clone()),
                ReturnType::Default => None,
            },
        }
    }
}

impl<'ast> Visit<'ast> for Collector<'_> {
    fn visit_item_mod(&mut self, item: &'ast syn::ItemMod) {
        let namespace = format!(
            "{}::{}",
            self.facts.scopes[self.current()].namespace,
            item.ident
        );
        if item.content.is_none() {
            self.facts.declared_modules.push(namespace);
            return;
        }
        self.facts.scopes.push(Scope::new(namespace));
        self.stack.push(self.facts.scopes.len() - 1);
        visit::visit_item_mod(self, item);
        self.stack.pop();
    }

    fn visit_item_use(&mut self, item: &'ast syn::ItemUse) {
        let current = self.current();
        self.facts.scopes[current].add_use(&item.tree);
    }

    fn visit_item_struct(&mut self, item: &'ast syn::ItemStruct) {
        let fields = match &item.fields {
            Fields::Named(named) => named
                .named
                .iter()
                .filter_map(|field| {
                    field.ident.as_ref().map(|ident| FieldFacts {
                        name: ident.to_string(),
                        public: is_public(&field.vis),
                        ty: field.ty.clone(),
                    })
                })
                .collect(),
            _ => Vec::new(),
        };
        self.declare(&item.attrs, &item.ident, &item.generics, fields);
        visit::visit_item_struct(self, item);
    }

    fn visit_item_enum(&mut self, item: &'ast syn::ItemEnum) {
        self.declare(&item.attrs, &item.ident, &item.generics, Vec::new());
        visit::visit_item_enum(self, item);
    }

    fn visit_item_impl(&mut self, item: &'ast syn::ItemImpl) {
        self.check_misplaced(&item.attrs);
        if let Some(self_ty) = type_path(&item.self_ty) {
            match &item.trait_ {
                Some((_, trait_path, _)) => self.facts.trait_impls.push(TraitImpl {
                    scope: self.current(),
                    self_ty,
                    trait_path: trait_path.clone(),
                }),
                None => {
                    for impl_item in &item.items {
                        if let syn::ImplItem::Fn(method) = impl_item {
                            self.check_misplaced(&method.attrs);
                            let facts = self.function(Some(self_ty.clone()), &method.sig);
                            self.facts.functions.push(facts);
                        }
                    }
                }
            }
        }
        visit::visit_item_impl(self, item);
    }

    fn visit_item_fn(&mut self, item: &'ast syn::ItemFn) {
        self.check_misplaced(&item.attrs);
        if item.sig.ident == "main" && self.current() == 0 {
            self.facts.has_main = true;
        }
        let facts = self.function(None, &item.sig);
        self.facts.functions.push(facts);
        visit::visit_item_fn(self, item);
    }

    fn visit_item_trait(&mut self, item: &'ast syn::ItemTrait) {
        self.check_misplaced(&item.attrs);
        visit::visit_item_trait(self, item);
    }

    fn visit_expr_method_call(&mut self, call: &'ast syn::ExprMethodCall) {
        if call.method == "add_module" {
            let from_turbofish = call.turbofish.as_ref().and_then(|turbofish| {
                turbofish.args.iter().find_map(|arg| match arg {
                    syn::GenericArgument::Type(ty) => type_path(ty),
                    _ => None,
                })
            });
            let module = from_turbofish.or_else(|| call.args.first().and_then(module_from_expr));
            if let Some(module) = module {
                self.facts.module_calls.push(ModuleCall {
                    scope: self.current(),
                    module,
                });
            }
        }
        visit::visit_expr_method_call(self, call);
    }
}

/// Module type constructed by an expression: `M`, `M { .. }`, `M::new(..)`.
fn module_from_expr(expr: &Expr) -> Option<syn::Path> {
    match expr {
        Expr::Path(path) => Some(path.path.clone()),
        Expr::Struct(item) => Some(item.path.clone()),
        Expr::Call(call) => match &*call.func {
            Expr::Path(func) if func.path.segments.len() > 1 => {
                let owner = func.path.segments.len() - 1;
                Some(syn::Path {
                    leading_colon: func.path.leading_colon,
                    segments: func.path.segments.iter().take(owner).cloned().collect(),
                })
            }
            _ => None,
        },
        Expr::Paren(inner) => module_from_expr(&inner.expr),
        _ => None,
    }
}
