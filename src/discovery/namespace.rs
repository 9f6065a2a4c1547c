//! Module paths of scanned files and resolution of paths written in them.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use syn::visit_mut::{self, VisitMut};
use syn::{UseTree, Visibility};

use crate::models::TypeName;

/// Namespace of a file relative to the source root.
///
/// `lib.rs`, `main.rs` and `mod.rs` collapse to their directory.
pub fn file_namespace(root_namespace: &str, relative: &Path) -> String {
    let mut segments = vec![root_namespace.to_string()];
    let components: Vec<String> = relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    let last = components.len().saturating_sub(1);
    for (i, component) in components.into_iter().enumerate() {
        if i == last && matches!(component.as_str(), "lib" | "main" | "mod") {
            continue;
        }
        segments.push(component);
    }
    segments.join("::")
}

/// Names brought into a scope by `use` items.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub namespace: String,
    /// Local name to full path.
    pub imports: HashMap<String, String>,
}

impl Scope {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            imports: HashMap::new(),
        }
    }

    /// Records every name imported by a `use` tree.
    pub fn add_use(&mut self, tree: &UseTree) {
        self.collect(Vec::new(), tree);
    }

    fn collect(&mut self, mut prefix: Vec<String>, tree: &UseTree) {
        match tree {
            UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.collect(prefix, &path.tree);
            }
            UseTree::Name(name) => {
                let ident = name.ident.to_string();
                if ident == "self" {
                    if let Some(last) = prefix.last().cloned() {
                        let full = self.absolutize(&prefix);
                        self.imports.insert(last, full);
                    }
                } else {
                    prefix.push(ident.clone());
                    let full = self.absolutize(&prefix);
                    self.imports.insert(ident, full);
                }
            }
            UseTree::Rename(rename) => {
                prefix.push(rename.ident.to_string());
                let full = self.absolutize(&prefix);
                self.imports.insert(rename.rename.to_string(), full);
            }
            UseTree::Group(group) => {
                for item in &group.items {
                    self.collect(prefix.clone(), item);
                }
            }
            UseTree::Glob(_) => {}
        }
    }

    /// Turns `self::`/`super::` prefixes of an import into absolute paths.
    fn absolutize(&self, segments: &[String]) -> String {
        match segments.first().map(String::as_str) {
            Some("self") | Some("super") => {
                let mut base: Vec<&str> = self.namespace.split("::").collect();
                let mut rest = segments;
                while let Some(first) = rest.first() {
                    match first.as_str() {
                        "self" => {}
                        "super" => {
                            if base.len() > 1 {
                                base.pop();
                            }
                        }
                        _ => break,
                    }
                    rest = &rest[1..];
                }
                let mut full: Vec<String> = base.into_iter().map(str::to_string).collect();
                full.extend(rest.iter().cloned());
                full.join("::")
            }
            _ => segments.join("::"),
        }
    }
}

/// Names that resolve to themselves when written bare.
const PRELUDE: &[&str] = &[
    "bool", "char", "str", "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32",
    "i64", "i128", "isize", "f32", "f64", "String", "Vec", "Box", "Option", "Result", "Clone",
    "Copy", "Default", "Drop", "Eq", "PartialEq", "Ord", "PartialOrd", "Send", "Sync", "Sized",
    "From", "Into", "TryFrom", "TryInto", "AsRef", "AsMut", "Iterator", "ToString", "ToOwned",
    "Fn", "FnMut", "FnOnce",
];

/// Resolves paths against scopes and the set of known namespaces.
#[derive(Debug, Default)]
pub struct PathResolver {
    namespaces: HashSet<String>,
}

impl PathResolver {
    pub fn new(namespaces: impl IntoIterator<Item = String>) -> Self {
        Self {
            namespaces: namespaces.into_iter().collect(),
        }
    }

    /// Resolves path segments written in `scope` to a full path.
    ///
    /// - `crate::` paths are kept
    /// - `self::`/`super::` are relative to the scope
    /// - prelude names and primitives are kept
    /// - a first segment imported by `use` expands through the import
    /// - a single segment, a type name or a child module is relative to the scope
    /// - anything else is an external crate path
    pub fn resolve(&self, scope: &Scope, segments: &[String]) -> String {
        let Some(first) = segments.first() else {
            return String::new();
        };
        match first.as_str() {
            "crate" => segments.join("::"),
            "self" | "super" => scope.absolutize(segments),
            name if segments.len() == 1 && PRELUDE.contains(&name) => name.to_string(),
            _ => {
                if let Some(import) = scope.imports.get(first) {
                    let mut full: Vec<String> = import.split("::").map(str::to_string).collect();
                    full.extend(segments[1..].iter().cloned());
                    return self.relative_or_absolute(scope, &full);
                }
                let is_type = first.starts_with(|c: char| c.is_ascii_uppercase());
                if segments.len() == 1 || is_type {
                    format!("{}::{}", scope.namespace, segments.join("::"))
                } else {
                    self.relative_or_absolute(scope, segments)
                }
            }
        }
    }

    /// Relative to the scope when the first segment is a known child module.
    fn relative_or_absolute(&self, scope: &Scope, segments: &[String]) -> String {
        let child = format!("{}::{}", scope.namespace, segments[0]);
        if segments[0] != "crate" && self.namespaces.contains(&child) {
            format!("{}::{}", scope.namespace, segments.join("::"))
        } else {
            segments.join("::")
        }
    }

    /// Resolves a `syn::Path`, ignoring generic arguments.
    pub fn resolve_path(&self, scope: &Scope, path: &syn::Path) -> TypeName {
        TypeName::parse(&self.resolve(scope, &path_segments(path)))
    }

    /// Rewrites every path inside a type to its full form.
    ///
    /// Generic arguments are kept and resolved in turn, so the type reads
    /// the same from any module of the crate.
    pub fn resolve_type(&self, scope: &Scope, ty: &syn::Type) -> syn::Type {
        let mut ty = ty.clone();
        TypeRewriter {
            resolver: self,
            scope,
        }
        .visit_type_mut(&mut ty);
        ty
    }

    fn rewrite_path(&self, scope: &Scope, path: &mut syn::Path) {
        if path.leading_colon.is_some() {
            return;
        }
        let segments = path_segments(path);
        if segments.first().is_some_and(|first| first == "Self") {
            return;
        }
        let resolved = self.resolve(scope, &segments);
        if resolved == segments.join("::") {
            return;
        }
        let Ok(mut rewritten) = syn::parse_str::<syn::Path>(&resolved) else {
            return;
        };
        if let (Some(last), Some(original)) = (rewritten.segments.last_mut(), path.segments.last())
        {
            last.arguments = original.arguments.clone();
        }
        *path = rewritten;
    }
}

struct TypeRewriter<'a> {
    resolver: &'a PathResolver,
    scope: &'a Scope,
}

impl VisitMut for TypeRewriter<'_> {
    fn visit_type_path_mut(&mut self, ty: &mut syn::TypePath) {
        visit_mut::visit_type_path_mut(self, ty);
        if ty.qself.is_none() {
            self.resolver.rewrite_path(self.scope, &mut ty.path);
        }
    }

    fn visit_trait_bound_mut(&mut self, bound: &mut syn::TraitBound) {
        visit_mut::visit_trait_bound_mut(self, bound);
        self.resolver.rewrite_path(self.scope, &mut bound.path);
    }
}

/// Identifiers of a path, without generic arguments.
pub fn path_segments(path: &syn::Path) -> Vec<String> {
    path.segments.iter().map(|s| s.ident.to_string()).collect()
}

pub fn is_public(vis: &Visibility) -> bool {
    matches!(vis, Visibility::Public(_))
}
