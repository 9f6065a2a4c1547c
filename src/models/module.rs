//! Module descriptors discovered from `#[module]` declarations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{RegistrationType, TypeName};

/// A named, typed parameter of a module constructor or property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Token text of the type with its paths resolved from the crate root.
    pub ty: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Property value applied to a referenced module after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyOverride {
    pub name: String,
    /// Expression as token text.
    pub value: String,
}

/// A dependency on another module declared via `depends_on(...)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleReference {
    pub module: TypeName,
    /// Positional constructor arguments as token text.
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyOverride>,
}

impl ModuleReference {
    pub fn new(module: TypeName) -> Self {
        Self {
            module,
            arguments: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// True when the reference constructs the module with explicit values.
    pub fn is_parameterized(&self) -> bool {
        !self.arguments.is_empty() || !self.properties.is_empty()
    }
}

/// One annotated module entry point.
///
/// Several descriptors can share an identity (repeated discovery, synthetic
/// program modules); the consolidator reduces them to one canonical value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Identity of the module type.
    pub ty: TypeName,
    /// File the declaration was found in.
    pub source_file: PathBuf,
    /// 1-indexed line of the declaration.
    #[serde(default)]
    pub line: usize,
    /// Synthesized whole-program module rather than a user declaration.
    #[serde(default)]
    pub auto_generated: bool,
    /// Only accept registrations realm-targeted at this module.
    #[serde(default)]
    pub only_realm: bool,
    /// Module-level default registration verb.
    #[serde(default)]
    pub registration_type: Option<RegistrationType>,
    /// Emit a companion marker usable as a dependency declaration.
    #[serde(default)]
    pub generate_attribute: bool,
    /// Name of a generated `ServiceCollection` extension method.
    #[serde(default)]
    pub use_method: Option<String>,
    /// Generate value equality so equal instances collapse during the walk.
    #[serde(default)]
    pub auto_equality: bool,
    /// Module implements `ConfigureServices`.
    #[serde(default)]
    pub configure: bool,
    /// Feature types this module provides.
    #[serde(default)]
    pub features: Vec<TypeName>,
    /// Ordering key among providers of the same feature.
    #[serde(default)]
    pub feature_order: i32,
    /// Feature types this module handles once all modules are applied.
    #[serde(default)]
    pub handles: Vec<TypeName>,
    /// Ordered constructor parameters.
    #[serde(default)]
    pub constructor: Vec<Parameter>,
    /// Settable properties exposed on the companion marker.
    #[serde(default)]
    pub properties: Vec<Property>,
    /// Nested module dependencies in declaration order.
    #[serde(default)]
    pub references: Vec<ModuleReference>,
    /// Modules found through alternate discovery (program entry calls).
    #[serde(default)]
    pub additional_modules: Vec<TypeName>,
}

/// Settable property of a module.
pub type Property = Parameter;

impl ModuleDescriptor {
    pub fn new(ty: TypeName, source_file: impl Into<PathBuf>) -> Self {
        Self {
            ty,
            source_file: source_file.into(),
            line: 0,
            auto_generated: false,
            only_realm: false,
            registration_type: None,
            generate_attribute: false,
            use_method: None,
            auto_equality: false,
            configure: false,
            features: Vec::new(),
            feature_order: 0,
            handles: Vec::new(),
            constructor: Vec::new(),
            properties: Vec::new(),
            references: Vec::new(),
            additional_modules: Vec::new(),
        }
    }

    /// Deduplication key: `(namespace, short name)`.
    pub fn identity(&self) -> (&str, &str) {
        (&self.ty.namespace, &self.ty.name)
    }

    /// Identity rendered as a path.
    pub fn id(&self) -> String {
        self.ty.full_name()
    }

    /// True when the module needs runtime-supplied constructor values.
    pub fn is_parameterized(&self) -> bool {
        !self.constructor.is_empty()
    }

    /// Identities of every module this one depends on, references first.
    pub fn dependency_ids(&self) -> impl Iterator<Item = String> + '_ {
        self.references
            .iter()
            .map(|r| r.module.full_name())
            .chain(self.additional_modules.iter().map(TypeName::full_name))
    }
}
