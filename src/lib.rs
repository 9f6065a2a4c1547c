//! Wiregen - compile-time dependency-injection module generator
//!
//! Scans a crate for `#[module]` and service declarations, resolves which
//! registrations belong to which module and emits the code that applies
//! them to a [`runtime::ServiceCollection`].

pub mod cli;
pub mod codegen;
pub mod config;
pub mod context;
pub mod di;
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod models;
pub mod runtime;
pub mod services;

// Re-export FromRef at crate root for di-macros generated code
pub use di::FromRef;

// Declaration attributes read by the generator
pub use di_macros::{module, scoped, singleton, transient};

#[doc(hidden)]
pub mod __private {
    pub use once_cell;
}
