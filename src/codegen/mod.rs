//! Code emission: renders generated units from resolved modules.
//!
//! Each canonical module gets a façade unit implementing
//! `wiregen::runtime::DependencyModule`, and a registrations unit when any
//! registration applies to it. Units are token streams built with `quote`
//! and rendered to text behind a fixed header, so identical input always
//! yields byte-identical files.
//!
//! Generated units are meant to be pulled into the crate with `include!`.
//! Both units of a module, and every unit of a synthesized program module,
//! belong in the crate root or the module's own namespace.

mod module;
pub mod naming;
mod registrations;

use proc_macro2::TokenStream;
use quote::quote;
use serde::Serialize;

pub use module::render_module;
pub use registrations::render_registrations;

use crate::error::GenError;
use crate::models::{ModuleDescriptor, TypeName};

/// Header placed at the top of every generated unit.
pub const HEADER: &str = "// @generated by wiregen. Do not edit by hand.\n";

/// One generated unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GeneratedFile {
    pub name: String,
    pub contents: String,
}

impl GeneratedFile {
    fn render(name: String, tokens: TokenStream) -> Self {
        Self {
            name,
            contents: format!("{}{}\n", HEADER, tokens),
        }
    }
}

/// Path of the runtime module as seen from generated code.
fn runtime() -> TokenStream {
    quote!(::wiregen::runtime)
}

/// Parses generated syntax, reporting failures against the module declaration.
struct Syntax<'a> {
    module: &'a ModuleDescriptor,
}

impl<'a> Syntax<'a> {
    fn new(module: &'a ModuleDescriptor) -> Self {
        Self { module }
    }

    fn error(&self, what: &str, text: &str, err: syn::Error) -> GenError {
        GenError::MalformedDeclaration {
            path: self.module.source_file.clone(),
            line: self.module.line,
            message: format!(
                "module {}: invalid {} `{}`: {}",
                self.module.id(),
                what,
                text,
                err
            ),
        }
    }

    fn path(&self, text: &str) -> Result<syn::Path, GenError> {
        syn::parse_str(text).map_err(|err| self.error("path", text, err))
    }

    fn type_path(&self, ty: &TypeName) -> Result<syn::Path, GenError> {
        self.path(&ty.full_name())
    }

    fn ty(&self, text: &str) -> Result<syn::Type, GenError> {
        syn::parse_str(text).map_err(|err| self.error("type", text, err))
    }

    fn expr(&self, text: &str) -> Result<syn::Expr, GenError> {
        syn::parse_str(text).map_err(|err| self.error("expression", text, err))
    }

    fn ident(&self, text: &str) -> Result<syn::Ident, GenError> {
        syn::parse_str(text).map_err(|err| self.error("name", text, err))
    }
}
