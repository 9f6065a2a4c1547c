//! Builds descriptors from the facts of every scanned file.

use std::collections::HashMap;
use std::path::Path;

use crate::config::ProjectConfig;
use crate::diagnostics::Diagnostic;
use crate::error::GenError;
use crate::models::{
    is_container_type, FactoryMethod, FactoryParameter, ModuleDescriptor, ModuleReference,
    Parameter, ParameterSource, PropertyOverride, RegistrationModel, ServiceDescriptor, TypeName,
};

use super::attributes::{
    open_generic_arity, token_text, type_path, AttributeKind, ModuleArgs, ReferenceArgument,
    ServiceArgs,
};
use super::namespace::{PathResolver, Scope};
use super::scanner::{line_of, DeclaredItem, FileFacts, FnFacts};

/// Descriptors built from a set of files.
#[derive(Debug, Default)]
pub struct Analysis {
    pub modules: Vec<ModuleDescriptor>,
    pub services: Vec<ServiceDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Cross-file lookup tables.
struct Index<'a> {
    resolver: PathResolver,
    /// Implementation path to implemented traits, in discovery order.
    interfaces: HashMap<String, Vec<TypeName>>,
    /// Function path to its file and facts.
    functions: HashMap<String, (&'a FileFacts, &'a FnFacts)>,
}

impl<'a> Index<'a> {
    fn build(files: &'a [FileFacts]) -> Self {
        let resolver = PathResolver::new(
            files.iter().flat_map(|file| {
                file.scopes
                    .iter()
                    .map(|scope| scope.namespace.clone())
                    .chain(file.declared_modules.iter().cloned())
            }),
        );

        let mut interfaces: HashMap<String, Vec<TypeName>> = HashMap::new();
        let mut functions = HashMap::new();
        for file in files {
            for trait_impl in &file.trait_impls {
                let scope = file.scope(trait_impl.scope);
                let self_ty = resolver.resolve_path(scope, &trait_impl.self_ty);
                let trait_ty = resolver.resolve_path(scope, &trait_impl.trait_path);
                let list = interfaces.entry(self_ty.full_name()).or_default();
                if !list.contains(&trait_ty) {
                    list.push(trait_ty);
                }
            }
            for function in &file.functions {
                let scope = file.scope(function.scope);
                let owner = match &function.owner {
                    Some(owner) => resolver.resolve_path(scope, owner).full_name(),
                    None => scope.namespace.clone(),
                };
                functions
                    .entry(format!("{}::{}", owner, function.name))
                    .or_insert((file, function));
            }
        }

        Self {
            resolver,
            interfaces,
            functions,
        }
    }

    /// Type text with every path it names written from the crate root.
    fn type_text(&self, scope: &Scope, ty: &syn::Type) -> String {
        token_text(&self.resolver.resolve_type(scope, ty))
    }
}

/// Analyzes collected facts into descriptors and diagnostics.
pub fn analyze(files: &[FileFacts], config: &ProjectConfig) -> Analysis {
    let index = Index::build(files);
    let mut analysis = Analysis::default();

    for file in files {
        for (line, name) in &file.misplaced {
            analysis.diagnostics.push(Diagnostic::error(
                &file.path,
                *line,
                format!("#[{}] can only be applied to a struct or enum", name),
            ));
        }

        for item in &file.items {
            for found in &item.attributes {
                if found.kind != AttributeKind::Module {
                    continue;
                }
                match module_descriptor(&index, file, item, &found.attr, config) {
                    Ok(module) => analysis.modules.push(module),
                    Err(err) => analysis
                        .diagnostics
                        .push(Diagnostic::from_error(&file.path, &err)),
                }
            }

            match service_descriptor(&index, file, item) {
                Ok(Some(service)) => analysis.services.push(service),
                Ok(None) => {}
                Err(err) => analysis
                    .diagnostics
                    .push(Diagnostic::from_error(&file.path, &err)),
            }
        }

        if config.auto_generate_module && file.has_main && !file.module_calls.is_empty() {
            analysis.modules.push(program_module(&index, file, config));
        }
    }

    tracing::debug!(
        "Analyzed {} files: {} modules, {} services",
        files.len(),
        analysis.modules.len(),
        analysis.services.len()
    );
    analysis
}

fn malformed(path: &Path, line: usize, message: impl Into<String>) -> GenError {
    GenError::MalformedDeclaration {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

fn from_syn(path: &Path, err: syn::Error) -> GenError {
    malformed(path, line_of(err.span()), err.to_string())
}

fn item_type(file: &FileFacts, item: &DeclaredItem) -> TypeName {
    TypeName::new(file.scope(item.scope).namespace.clone(), item.ident.clone())
}

fn module_descriptor(
    index: &Index,
    file: &FileFacts,
    item: &DeclaredItem,
    attr: &syn::Attribute,
    config: &ProjectConfig,
) -> Result<ModuleDescriptor, GenError> {
    let line = line_of(syn::spanned::Spanned::span(attr));
    if item.type_params > 0 {
        return Err(malformed(
            &file.path,
            item.line,
            format!("module {} cannot be generic", item.ident),
        ));
    }
    let args = ModuleArgs::parse(attr).map_err(|err| from_syn(&file.path, err))?;
    let scope = file.scope(item.scope);
    let resolve = |path: &syn::Path| index.resolver.resolve_path(scope, path);

    let mut module = ModuleDescriptor::new(item_type(file, item), &file.path);
    module.line = line;
    module.only_realm = args.only_realm;
    module.registration_type = args.registration;
    module.generate_attribute = args.generate_attribute.unwrap_or(config.generate_attribute);
    module.use_method = args.use_method;
    module.auto_equality = args.auto_equality;
    module.configure = args.configure;
    module.features = args.features.iter().map(resolve).collect();
    module.feature_order = args.feature_order;
    module.handles = args.handles.iter().map(resolve).collect();

    for raw in &args.depends_on {
        let mut reference = ModuleReference::new(resolve(&raw.path));
        for argument in &raw.arguments {
            match argument {
                ReferenceArgument::Positional(expr) => reference.arguments.push(token_text(expr)),
                ReferenceArgument::Property(name, expr) => {
                    reference.properties.push(PropertyOverride {
                        name: name.to_string(),
                        value: token_text(expr),
                    })
                }
            }
        }
        module.references.push(reference);
    }

    if let Some((ctor_file, constructor)) = index.functions.get(&format!("{}::new", module.id())) {
        if !constructor.has_receiver && constructor.returns_self {
            let ctor_scope = ctor_file.scope(constructor.scope);
            module.constructor = constructor
                .inputs
                .iter()
                .map(|(name, ty)| Parameter::new(name.clone(), index.type_text(ctor_scope, ty)))
                .collect();
        }
    }
    module.properties = item
        .fields
        .iter()
        .filter(|field| field.public)
        .filter(|field| !module.constructor.iter().any(|p| p.name == field.name))
        .map(|field| Parameter::new(field.name.clone(), index.type_text(scope, &field.ty)))
        .collect();

    Ok(module)
}

fn service_descriptor(
    index: &Index,
    file: &FileFacts,
    item: &DeclaredItem,
) -> Result<Option<ServiceDescriptor>, GenError> {
    let scope = file.scope(item.scope);
    let mut service = ServiceDescriptor::new(
        item_type(file, item).with_generic_arity(item.type_params),
    );
    service.source_file = file.path.clone();
    service.interfaces = index
        .interfaces
        .get(&service.implementation.full_name())
        .cloned()
        .unwrap_or_default();

    let mut factory_path: Option<(String, usize)> = None;
    for found in &item.attributes {
        let lifetime = match &found.kind {
            AttributeKind::Service(lifetime) => *lifetime,
            AttributeKind::Unknown(name) => {
                return Err(malformed(
                    &file.path,
                    found.line,
                    GenError::UnknownLifetime(name.clone()).to_string(),
                ))
            }
            AttributeKind::Module => continue,
        };
        let args = ServiceArgs::parse(&found.attr).map_err(|err| from_syn(&file.path, err))?;

        let mut registration = RegistrationModel::new(lifetime);
        registration.line = found.line;
        registration.registration_type = args.registration;
        registration.key = args.key;
        registration.cross_wire = args.cross_wire;
        if let Some(path) = &args.service {
            let arity = open_generic_arity(path).map_err(|err| from_syn(&file.path, err))?;
            registration.service =
                Some(index.resolver.resolve_path(scope, path).with_generic_arity(arity));
        }
        if let Some(path) = &args.realm {
            registration.realm = Some(index.resolver.resolve_path(scope, path));
        }
        if let Some(path) = &args.factory {
            let full = index.resolver.resolve_path(scope, path).full_name();
            match &factory_path {
                Some((existing, _)) if *existing != full => {
                    return Err(malformed(
                        &file.path,
                        found.line,
                        format!(
                            "{} declares conflicting factories {} and {}",
                            item.ident, existing, full
                        ),
                    ))
                }
                _ => factory_path = Some((full, found.line)),
            }
        }
        service.registrations.push(registration);
    }

    if service.is_empty() {
        return Ok(None);
    }
    if let Some((path, line)) = factory_path {
        service.factory = Some(factory_method(index, file, &service, &path, line)?);
    }
    Ok(Some(service))
}

fn factory_method(
    index: &Index,
    file: &FileFacts,
    service: &ServiceDescriptor,
    path: &str,
    line: usize,
) -> Result<FactoryMethod, GenError> {
    let unknown = || {
        malformed(
            &file.path,
            line,
            GenError::UnknownFactory {
                service: service.implementation.full_name(),
                factory: path.to_string(),
            }
            .to_string(),
        )
    };
    let (factory_file, function) = index.functions.get(path).ok_or_else(unknown)?;
    if function.has_receiver {
        return Err(malformed(
            &file.path,
            line,
            format!("factory {} must not take self", path),
        ));
    }

    let scope = factory_file.scope(function.scope);
    let mut parameters = Vec::with_capacity(function.inputs.len());
    for (name, ty) in &function.inputs {
        let parameter = factory_parameter(index, scope, name, ty).map_err(|message| {
            malformed(
                &factory_file.path,
                function.line,
                format!("factory {}: {}", path, message),
            )
        })?;
        parameters.push(parameter);
    }

    let container_only = parameters.len() == 1
        && matches!(parameters[0].source, ParameterSource::Container);
    if container_only && !returns_instance(function.output.as_ref()) {
        return Err(malformed(
            &factory_file.path,
            function.line,
            format!(
                "factory {} takes only the resolver and must return Result<Instance, ResolveError>",
                path
            ),
        ));
    }
    Ok(FactoryMethod::new(path, parameters))
}

fn factory_parameter(
    index: &Index,
    scope: &Scope,
    name: &str,
    ty: &syn::Type,
) -> Result<FactoryParameter, String> {
    if is_container_type(&token_text(ty)) {
        return Ok(FactoryParameter::container(name));
    }
    if let syn::Type::Reference(_) = ty {
        return Err(format!(
            "parameter `{}` borrows; take `Arc<T>` or an owned value",
            name
        ));
    }
    if let Some(inner) = arc_inner(ty) {
        let service = type_path(inner)
            .map(|path| index.resolver.resolve_path(scope, &path))
            .ok_or_else(|| format!("parameter `{}` has an unsupported type", name))?;
        return Ok(FactoryParameter::shared(name, index.type_text(scope, inner), service));
    }
    let service = type_path(ty)
        .map(|path| index.resolver.resolve_path(scope, &path))
        .ok_or_else(|| format!("parameter `{}` has an unsupported type", name))?;
    Ok(FactoryParameter::cloned(name, index.type_text(scope, ty), service))
}

/// Whether a return type reads as `Result<Instance, ResolveError>`.
fn returns_instance(output: Option<&syn::Type>) -> bool {
    let Some(last) = output.and_then(type_path).and_then(|p| p.segments.last().cloned()) else {
        return false;
    };
    if last.ident != "Result" {
        return false;
    }
    let syn::PathArguments::AngleBracketed(args) = &last.arguments else {
        return false;
    };
    let names: Vec<String> = args
        .args
        .iter()
        .filter_map(|arg| match arg {
            syn::GenericArgument::Type(ty) => type_path(ty)
                .and_then(|p| p.segments.last().map(|s| s.ident.to_string())),
            _ => None,
        })
        .collect();
    names == ["Instance", "ResolveError"]
}

/// `T` of an `Arc<T>` type.
fn arc_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let syn::Type::Path(path) = ty else {
        return None;
    };
    let last = path.path.segments.last()?;
    if last.ident != "Arc" {
        return None;
    }
    match &last.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first()? {
            syn::GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

fn program_module(index: &Index, file: &FileFacts, config: &ProjectConfig) -> ModuleDescriptor {
    let mut module = ModuleDescriptor::new(
        TypeName::new(config.root_namespace.clone(), "ProgramModule"),
        &file.path,
    );
    module.auto_generated = true;
    for call in &file.module_calls {
        let ty = index.resolver.resolve_path(file.scope(call.scope), &call.module);
        if !module.additional_modules.contains(&ty) {
            module.additional_modules.push(ty);
        }
    }
    module
}
