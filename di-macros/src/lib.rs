//! Macros for wiregen.
//!
//! Two groups of macros live here:
//! - `#[derive(Context)]` and `#[derive(FromContext)]` wire the generator's
//!   own collaborators through the `FromRef` trait
//! - `#[module]`, `#[transient]`, `#[scoped]` and `#[singleton]` mark the
//!   declarations the generator scans for
//!
//! Generated `FromRef` impls reference `crate::FromRef`, so the consuming
//! crate must re-export the trait at its root.

use proc_macro::TokenStream;

mod context;
mod declare;
mod from_context;

/// Derive macro for creating a DI context.
///
/// When applied to a struct, generates `FromRef` implementations for each
/// field type, allowing them to be extracted from the context. Field types
/// must be distinct and implement `Clone`.
///
/// # Example
///
/// ```ignore
/// #[derive(Context, Clone)]
/// pub struct GeneratorContext {
///     pub config: Arc<ProjectConfig>,
///     pub log: DiagnosticLog,
/// }
///
/// // Generated implementations:
/// // impl FromRef<GeneratorContext> for Arc<ProjectConfig> { ... }
/// // impl FromRef<GeneratorContext> for DiagnosticLog { ... }
/// ```
#[proc_macro_derive(Context)]
pub fn derive_context(input: TokenStream) -> TokenStream {
    context::derive_context_impl(input)
}

/// Derive macro for types that can be constructed from a context.
///
/// Generates a `FromRef<Context>` implementation resolving each field with
/// `FromRef::from_ref`. Fields marked `#[from_context(default)]` are built
/// with `Default` instead.
///
/// # Example
///
/// ```ignore
/// #[derive(FromContext, Clone)]
/// #[from_context(Context = GeneratorContext)]
/// pub struct Generator {
///     config: Arc<ProjectConfig>,   // resolved via FromRef
///     #[from_context(default)]
///     cache: GenerationCache,       // GenerationCache::default()
/// }
/// ```
///
/// The context type defaults to `Context`; it may be given as a path or as
/// a string literal.
#[proc_macro_derive(FromContext, attributes(from_context))]
pub fn derive_from_context(input: TokenStream) -> TokenStream {
    from_context::derive_from_context_impl(input)
}

/// Declares a dependency module.
///
/// ```ignore
/// #[wiregen::module(depends_on(DbModule, HttpModule(8080, verbose = true)), auto_equality)]
/// pub struct AppModule;
/// ```
///
/// Arguments are checked and the struct is returned as written, plus a
/// `PartialEq` derive when `auto_equality` is requested and missing.
#[proc_macro_attribute]
pub fn module(args: TokenStream, item: TokenStream) -> TokenStream {
    declare::module_impl(args, item)
}

/// Declares a service with a new instance per resolution.
///
/// ```ignore
/// #[wiregen::transient(service = dyn Clock, realm = crate::AppModule)]
/// pub struct SystemClock;
/// ```
#[proc_macro_attribute]
pub fn transient(args: TokenStream, item: TokenStream) -> TokenStream {
    declare::service_impl("transient", args, item)
}

/// Declares a service with one instance per container scope.
#[proc_macro_attribute]
pub fn scoped(args: TokenStream, item: TokenStream) -> TokenStream {
    declare::service_impl("scoped", args, item)
}

/// Declares a service with one instance per root container.
#[proc_macro_attribute]
pub fn singleton(args: TokenStream, item: TokenStream) -> TokenStream {
    declare::service_impl("singleton", args, item)
}
