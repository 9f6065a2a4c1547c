//! Service descriptors discovered from `#[transient]`, `#[scoped]` and `#[singleton]`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{Lifetime, RegistrationType, TypeName};

/// Traits that never count as a service contract.
///
/// These are derive, marker and plumbing traits a type implements for
/// reasons unrelated to the service it offers.
pub const INFRASTRUCTURE_TRAITS: &[&str] = &[
    "Any",
    "AsMut",
    "AsRef",
    "Clone",
    "ConfigureServices",
    "Copy",
    "Debug",
    "Default",
    "DependencyModule",
    "Deref",
    "DerefMut",
    "Deserialize",
    "Display",
    "Drop",
    "Eq",
    "Error",
    "From",
    "FromRef",
    "Hash",
    "Into",
    "Iterator",
    "Ord",
    "PartialEq",
    "PartialOrd",
    "Send",
    "Serialize",
    "Sync",
    "TryFrom",
];

/// Returns true if the trait is plumbing rather than a service contract.
pub fn is_infrastructure_trait(ty: &TypeName) -> bool {
    INFRASTRUCTURE_TRAITS.contains(&ty.name.as_str())
}

/// Name of the container parameter type accepted by factories.
pub const CONTAINER_TYPE: &str = "ServiceResolver";

/// Returns true if a parameter type is the container (`&dyn ServiceResolver`).
pub fn is_container_type(ty: &str) -> bool {
    let spaced = ty.replace('&', " & ");
    let mut tokens = spaced.split_whitespace().peekable();
    if tokens.next() != Some("&") {
        return false;
    }
    // Skip an explicit lifetime such as `&'a dyn ...`.
    tokens.next_if(|token| token.starts_with('\''));
    if tokens.next() != Some("dyn") {
        return false;
    }
    let path: String = tokens.collect();
    path.rsplit("::").next() == Some(CONTAINER_TYPE)
}

/// Where a factory argument comes from at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterSource {
    /// The container itself (`&dyn ServiceResolver`).
    Container,
    /// `Arc<T>` resolved from the container as a shared instance of `ty`.
    Shared { ty: String, service: TypeName },
    /// A value resolved from the container and cloned out of its `Arc`.
    Cloned { ty: String, service: TypeName },
}

/// A parameter of a factory function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactoryParameter {
    pub name: String,
    /// Token text of the type with its paths resolved from the crate root.
    pub ty: String,
    pub source: ParameterSource,
}

impl FactoryParameter {
    /// The container parameter.
    pub fn container(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: format!("&dyn {}", CONTAINER_TYPE),
            source: ParameterSource::Container,
        }
    }

    /// An `Arc<ty>` parameter resolved under `service`.
    pub fn shared(name: impl Into<String>, ty: impl Into<String>, service: TypeName) -> Self {
        let ty = ty.into();
        Self {
            name: name.into(),
            ty: format!("Arc<{}>", ty),
            source: ParameterSource::Shared { ty, service },
        }
    }

    /// A by-value parameter resolved under `service` and cloned.
    pub fn cloned(name: impl Into<String>, ty: impl Into<String>, service: TypeName) -> Self {
        let ty = ty.into();
        Self {
            name: name.into(),
            ty: ty.clone(),
            source: ParameterSource::Cloned { ty, service },
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.source, ParameterSource::Container)
    }
}

/// A static function used instead of direct construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactoryMethod {
    /// Full path of the function, e.g. `crate::mail::Mailer::create`.
    pub path: String,
    /// Ordered parameters of the function.
    #[serde(default)]
    pub parameters: Vec<FactoryParameter>,
}

impl FactoryMethod {
    pub fn new(path: impl Into<String>, parameters: Vec<FactoryParameter>) -> Self {
        Self {
            path: path.into(),
            parameters,
        }
    }

    /// True when the function can be handed to the container as-is.
    pub fn takes_container_only(&self) -> bool {
        matches!(self.parameters.as_slice(), [only] if only.is_container())
    }

    /// Name of the synthesized wrapper resolving each parameter from the container.
    pub fn glue_name(&self) -> String {
        let flat: String = self
            .path
            .trim_start_matches("crate::")
            .split("::")
            .map(|segment| segment.to_lowercase())
            .collect::<Vec<_>>()
            .join("_");
        format!("__wiregen_glue_{}", flat)
    }
}

/// One registration declaration on an implementation type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationModel {
    /// Explicit contract type; resolved through the default chain when absent.
    #[serde(default)]
    pub service: Option<TypeName>,
    pub lifetime: Lifetime,
    /// Registration-level verb.
    #[serde(default)]
    pub registration_type: Option<RegistrationType>,
    /// Module this registration is scoped to; global when absent.
    #[serde(default)]
    pub realm: Option<TypeName>,
    #[serde(default)]
    pub key: Option<String>,
    /// Expose the implementation under every contract trait it implements.
    #[serde(default)]
    pub cross_wire: bool,
    /// 1-indexed line of the attribute.
    #[serde(default)]
    pub line: usize,
}

impl RegistrationModel {
    pub fn new(lifetime: Lifetime) -> Self {
        Self {
            service: None,
            lifetime,
            registration_type: None,
            realm: None,
            key: None,
            cross_wire: false,
            line: 0,
        }
    }

    /// Whether this registration applies to a module.
    ///
    /// Realm-targeted registrations apply only to their realm; global ones
    /// apply to every module that is not realm-only.
    pub fn applies_to(&self, module: &TypeName, only_realm: bool) -> bool {
        match &self.realm {
            Some(realm) => realm == module,
            None => !only_realm,
        }
    }
}

/// An annotated implementation type and all of its registrations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub implementation: TypeName,
    #[serde(default)]
    pub source_file: PathBuf,
    /// Traits implemented by the type, in source order.
    #[serde(default)]
    pub interfaces: Vec<TypeName>,
    /// Registrations in attribute order.
    #[serde(default)]
    pub registrations: Vec<RegistrationModel>,
    #[serde(default)]
    pub factory: Option<FactoryMethod>,
}

impl ServiceDescriptor {
    pub fn new(implementation: TypeName) -> Self {
        Self {
            implementation,
            source_file: PathBuf::new(),
            interfaces: Vec::new(),
            registrations: Vec::new(),
            factory: None,
        }
    }

    /// Descriptors without registrations contribute nothing.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Implemented traits that qualify as service contracts.
    pub fn contracts(&self) -> impl Iterator<Item = &TypeName> {
        self.interfaces
            .iter()
            .filter(|ty| !is_infrastructure_trait(ty))
    }

    /// Contract type a registration is made under.
    ///
    /// Explicit type, else the first contract trait, else the implementation.
    pub fn service_type(&self, registration: &RegistrationModel) -> TypeName {
        registration
            .service
            .clone()
            .or_else(|| self.contracts().next().cloned())
            .unwrap_or_else(|| self.implementation.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_container_type() {
        assert!(is_container_type("&dyn ServiceResolver"));
        assert!(is_container_type("& 'a dyn wiregen::runtime::ServiceResolver"));
        assert!(is_container_type("& dyn crate :: ServiceResolver"));
        assert!(!is_container_type("dyn ServiceResolver"));
        assert!(!is_container_type("&Config"));
        assert!(!is_container_type("Arc<dyn ServiceResolver>"));
    }

    #[test]
    fn test_factory_takes_container_only() {
        let direct = FactoryMethod::new(
            "crate::mail::create",
            vec![FactoryParameter::container("sp")],
        );
        assert!(direct.takes_container_only());

        let glued = FactoryMethod::new(
            "crate::mail::Mailer::create",
            vec![
                FactoryParameter::container("sp"),
                FactoryParameter::shared("config", "Config", TypeName::new("crate", "Config")),
            ],
        );
        assert_eq!(glued.parameters[1].ty, "Arc<Config>");
        assert!(!glued.takes_container_only());
        assert_eq!(glued.glue_name(), "__wiregen_glue_mail_mailer_create");
    }

    #[test]
    fn test_service_type_default_chain() {
        let mut service = ServiceDescriptor::new(TypeName::new("crate::mail", "SmtpMailer"));
        service.interfaces = vec![
            TypeName::parse("Clone"),
            TypeName::parse("std::fmt::Debug"),
            TypeName::new("crate::mail", "Mailer"),
        ];
        let implicit = RegistrationModel::new(Lifetime::Singleton);
        assert_eq!(
            service.service_type(&implicit),
            TypeName::new("crate::mail", "Mailer")
        );

        let mut explicit = implicit.clone();
        explicit.service = Some(TypeName::new("crate::mail", "Transport"));
        assert_eq!(
            service.service_type(&explicit),
            TypeName::new("crate::mail", "Transport")
        );

        service.interfaces.truncate(2);
        assert_eq!(service.service_type(&implicit), service.implementation);
    }

    #[test]
    fn test_applies_to_realm_rules() {
        let module = TypeName::new("crate", "AppModule");
        let other = TypeName::new("crate", "OtherModule");

        let global = RegistrationModel::new(Lifetime::Transient);
        assert!(global.applies_to(&module, false));
        assert!(!global.applies_to(&module, true));

        let mut scoped = global.clone();
        scoped.realm = Some(module.clone());
        assert!(scoped.applies_to(&module, false));
        assert!(scoped.applies_to(&module, true));
        assert!(!scoped.applies_to(&other, false));
    }
}
