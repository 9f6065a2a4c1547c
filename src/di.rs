//! Dependency injection for the generator's own collaborators.
//!
//! The generator wires its services with the `FromRef` trait and the derive
//! macros from `di-macros`.
//!
//! # Overview
//!
//! - `FromRef<T>`: Trait for extracting a value from a reference to `T`
//! - `#[derive(Context)]`: Makes each field of a struct extractable via `FromRef`
//! - `#[derive(FromContext)]`: Generates a `FromRef` impl by resolving each field
//!
//! # Example
//!
//! ```ignore
//! use crate::di::FromRef;
//! use di_macros::{Context, FromContext};
//!
//! #[derive(Context, Clone)]
//! pub struct GeneratorContext {
//!     pub config: Arc<ProjectConfig>,
//!     pub log: DiagnosticLog,
//! }
//!
//! #[derive(FromContext, Clone)]
//! #[from_context(Context = GeneratorContext)]
//! pub struct Discovery {
//!     config: Arc<ProjectConfig>,
//! }
//!
//! let discovery = Discovery::from_ref(&ctx);
//! ```

/// Trait for extracting a value from a reference to another type.
///
/// Types that implement `FromRef<T>` can be extracted from `&T`.
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

/// Any `Clone` type can be extracted from itself.
impl<T: Clone> FromRef<T> for T {
    fn from_ref(input: &T) -> Self {
        input.clone()
    }
}

pub use di_macros::{Context, FromContext};
