//! Deterministic names of generated files and items.

use crate::models::TypeName;

/// Shared suffix of every generated unit; discovery never scans these.
pub const GENERATED_SUFFIX: &str = ".g.rs";
/// Suffix of module façade units.
pub const MODULE_SUFFIX: &str = "module.g.rs";
/// Suffix of registration units.
pub const REGISTRATIONS_SUFFIX: &str = "registrations.g.rs";

/// `<ns>.<Name>` with `::` in the namespace replaced by `.`.
pub fn file_stem(ty: &TypeName) -> String {
    if ty.namespace.is_empty() {
        ty.name.clone()
    } else {
        format!("{}.{}", ty.namespace.replace("::", "."), ty.name)
    }
}

pub fn module_file_name(ty: &TypeName) -> String {
    format!("{}.{}", file_stem(ty), MODULE_SUFFIX)
}

pub fn registrations_file_name(ty: &TypeName) -> String {
    format!("{}.{}", file_stem(ty), REGISTRATIONS_SUFFIX)
}

/// Name of the companion marker of a module.
pub fn dependency_name(ty: &TypeName) -> String {
    format!("{}Dependency", ty.name)
}

/// Name of the extension trait carrying a module's `use_method`.
pub fn extension_trait_name(ty: &TypeName) -> String {
    format!("{}ServiceCollectionExt", ty.name)
}

/// Associated function returning a module's registration operations.
pub const REGISTRATIONS_FN: &str = "__wiregen_registrations";
