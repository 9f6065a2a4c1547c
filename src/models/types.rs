//! Type identities, lifetimes and registration verbs.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fully-qualified identity of a Rust type discovered in the sources.
///
/// The namespace is a module path (`crate::billing`); the pair
/// `(namespace, name)` is the identity used for module deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeName {
    /// Module path containing the type.
    pub namespace: String,
    /// Short type name.
    pub name: String,
    /// Number of generic parameters left open (0 for concrete types).
    #[serde(default)]
    pub generic_arity: usize,
}

impl TypeName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            generic_arity: 0,
        }
    }

    /// Splits a `::` separated path into namespace and short name.
    ///
    /// A bare name gets an empty namespace.
    pub fn parse(path: &str) -> Self {
        match path.rsplit_once("::") {
            Some((namespace, name)) => Self::new(namespace, name),
            None => Self::new("", path),
        }
    }

    pub fn with_generic_arity(mut self, arity: usize) -> Self {
        self.generic_arity = arity;
        self
    }

    /// Path of the type without generic parameters.
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.namespace, self.name)
        }
    }

    pub fn is_open_generic(&self) -> bool {
        self.generic_arity > 0
    }

    /// Key the type is registered under at runtime.
    ///
    /// Open generics render their parameters as `_` placeholders.
    pub fn key(&self) -> String {
        if self.is_open_generic() {
            let params = vec!["_"; self.generic_arity].join(", ");
            format!("{}<{}>", self.full_name(), params)
        } else {
            self.full_name()
        }
    }
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

/// Service lifetime, fixed by the attribute kind used on the implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// New instance per resolution.
    Transient,
    /// One instance per container scope.
    Scoped,
    /// One instance per root container.
    Singleton,
}

impl Lifetime {
    /// Attribute names that declare a service, in lifetime order.
    pub const ATTRIBUTES: [&'static str; 3] = ["transient", "scoped", "singleton"];

    pub fn attribute_name(&self) -> &'static str {
        match self {
            Lifetime::Transient => "transient",
            Lifetime::Scoped => "scoped",
            Lifetime::Singleton => "singleton",
        }
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Lifetime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transient" | "Transient" => Ok(Lifetime::Transient),
            "scoped" | "Scoped" => Ok(Lifetime::Scoped),
            "singleton" | "Singleton" => Ok(Lifetime::Singleton),
            _ => Err(format!(
                "Invalid lifetime '{}'. Valid values: transient, scoped, singleton",
                s
            )),
        }
    }
}

/// Container-mutation verb applied to a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationType {
    /// Always append.
    #[default]
    Add,
    /// Append only if the service is not registered yet.
    Try,
    /// Append only if this exact implementation is not registered for the service.
    TryEnumerable,
    /// Replace the first existing registration of the service.
    Replace,
}

impl RegistrationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationType::Add => "add",
            RegistrationType::Try => "try",
            RegistrationType::TryEnumerable => "try_enumerable",
            RegistrationType::Replace => "replace",
        }
    }

    /// First declared verb along the precedence chain, falling back to `Add`.
    pub fn resolve(
        registration: Option<RegistrationType>,
        module: Option<RegistrationType>,
        project: Option<RegistrationType>,
    ) -> RegistrationType {
        registration.or(module).or(project).unwrap_or_default()
    }
}

impl std::fmt::Display for RegistrationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" | "Add" => Ok(RegistrationType::Add),
            "try" | "Try" | "try_add" | "TryAdd" => Ok(RegistrationType::Try),
            "try_enumerable" | "TryEnumerable" => Ok(RegistrationType::TryEnumerable),
            "replace" | "Replace" => Ok(RegistrationType::Replace),
            _ => Err(format!(
                "Invalid registration type '{}'. Valid values: add, try, try_enumerable, replace",
                s
            )),
        }
    }
}
