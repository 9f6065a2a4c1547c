//! Generation pipeline: consolidation, graph checks and per-module emission.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::consolidate::consolidate;
use super::emitter::emit_registrations;
use super::graph::ModuleGraph;
use super::resolver::resolve_module;
use crate::codegen::{render_module, render_registrations, GeneratedFile};
use crate::config::ProjectConfig;
use crate::context::GeneratorContext;
use crate::di::FromContext;
use crate::diagnostics::{CancellationToken, Diagnostic, DiagnosticLog};
use crate::discovery::DiscoveryOutput;
use crate::error::GenError;
use crate::models::{ModuleDescriptor, ServiceDescriptor};

/// Everything a module's generated units depend on.
///
/// Two equal inputs always render identical files, which makes this the
/// cache key of the per-module stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleInput {
    pub module: ModuleDescriptor,
    /// Services with at least one registration applying to the module.
    pub services: Vec<ServiceDescriptor>,
    pub config: ProjectConfig,
}

impl ModuleInput {
    pub fn new(
        module: &ModuleDescriptor,
        services: &[ServiceDescriptor],
        config: &ProjectConfig,
    ) -> Self {
        let services = services
            .iter()
            .filter(|service| {
                service
                    .registrations
                    .iter()
                    .any(|r| r.applies_to(&module.ty, module.only_realm))
            })
            .cloned()
            .collect();
        Self {
            module: module.clone(),
            services,
            config: config.clone(),
        }
    }
}

/// Files and diagnostics produced for one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleOutput {
    pub files: Vec<GeneratedFile>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Cache counters since the cache was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<ModuleInput, ModuleOutput>,
    stats: CacheStats,
}

/// Per-module output cache shared by clones of a generator.
#[derive(Debug, Clone, Default)]
pub struct GenerationCache(Arc<Mutex<CacheState>>);

impl GenerationCache {
    fn state(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn get(&self, input: &ModuleInput) -> Option<ModuleOutput> {
        let mut state = self.state();
        let cached = state.entries.get(input).cloned();
        match cached {
            Some(_) => state.stats.hits += 1,
            None => state.stats.misses += 1,
        }
        cached
    }

    fn insert(&self, input: ModuleInput, output: ModuleOutput) {
        self.state().entries.insert(input, output);
    }

    pub fn stats(&self) -> CacheStats {
        self.state().stats
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationOutput {
    /// Generated units, module by module in consolidation order.
    pub files: Vec<GeneratedFile>,
    /// Discovery diagnostics followed by generation diagnostics.
    pub diagnostics: Vec<Diagnostic>,
    /// Identities of the canonical modules.
    pub modules: Vec<String>,
}

impl GenerationOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn file(&self, name: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|file| file.name == name)
    }

    /// Writes every unit into `dir`. Existing files not produced by this
    /// pass are left alone.
    pub fn write_to(&self, dir: &Path) -> Result<usize, GenError> {
        std::fs::create_dir_all(dir)?;
        for file in &self.files {
            std::fs::write(dir.join(&file.name), &file.contents)?;
        }
        Ok(self.files.len())
    }
}

/// Turns discovered descriptors into generated units.
#[derive(FromContext, Clone)]
#[from_context(Context = GeneratorContext)]
pub struct Generator {
    config: Arc<ProjectConfig>,
    log: DiagnosticLog,
    cancel: CancellationToken,
    #[from_context(default)]
    cache: GenerationCache,
}

impl Generator {
    pub fn cache(&self) -> &GenerationCache {
        &self.cache
    }

    /// Runs consolidation and generates every canonical module.
    ///
    /// A module whose declaration cannot be rendered contributes error
    /// diagnostics and no files; other modules are unaffected.
    /// Cancellation discards everything produced so far.
    pub fn generate(&self, discovery: &DiscoveryOutput) -> Result<GenerationOutput, GenError> {
        self.cancel.check()?;
        let consolidated = consolidate(discovery.modules.clone());
        let config = if discovery.modules.is_empty() {
            ProjectConfig::clone(&self.config)
        } else {
            consolidated.config.clone()
        };
        let graph = ModuleGraph::new(&consolidated.modules);

        let mut output = GenerationOutput {
            diagnostics: discovery.diagnostics.clone(),
            modules: consolidated.modules.iter().map(ModuleDescriptor::id).collect(),
            ..GenerationOutput::default()
        };

        for (module, target) in graph.external_references() {
            let message = format!(
                "module {} references {}, which is not part of this compilation",
                module.id(),
                target
            );
            tracing::warn!("{}", message);
            self.log.warn(&message);
            output
                .diagnostics
                .push(Diagnostic::warning(&module.source_file, module.line, message));
        }

        for module in &consolidated.modules {
            self.cancel.check()?;

            let problems = reference_problems(module, &graph);
            if !problems.is_empty() {
                for problem in &problems {
                    self.log.error(&problem.to_string());
                }
                output.diagnostics.extend(problems);
                continue;
            }

            let input = ModuleInput::new(module, &discovery.services, &config);
            let module_output = match self.cache.get(&input) {
                Some(cached) => {
                    tracing::debug!("Reusing cached output for module {}", module.id());
                    cached
                }
                None => {
                    tracing::debug!("Generating module {}", module.id());
                    let generated = generate_module(&input);
                    self.cache.insert(input, generated.clone());
                    generated
                }
            };
            output.files.extend(module_output.files);
            output.diagnostics.extend(module_output.diagnostics);
        }

        tracing::info!(
            "Generated {} files for {} modules",
            output.files.len(),
            output.modules.len()
        );
        self.log.info(&format!(
            "generated {} files for {} modules",
            output.files.len(),
            output.modules.len()
        ));
        Ok(output)
    }
}

/// Renders both units of one module.
pub fn generate_module(input: &ModuleInput) -> ModuleOutput {
    let module = &input.module;
    let resolved = resolve_module(module, &input.services, input.config.default_registration);
    let ops = emit_registrations(&resolved);

    let mut files = Vec::with_capacity(2);
    let rendered = render_module(module, !resolved.is_empty()).and_then(|facade| {
        files.push(facade);
        if !resolved.is_empty() {
            files.push(render_registrations(module, &resolved, &ops)?);
        }
        Ok(())
    });

    match rendered {
        Ok(()) => ModuleOutput {
            files,
            diagnostics: Vec::new(),
        },
        Err(err) => {
            tracing::warn!("Skipping module {}: {}", module.id(), err);
            ModuleOutput {
                files: Vec::new(),
                diagnostics: vec![Diagnostic::from_error(&module.source_file, &err)],
            }
        }
    }
}

/// References that cannot construct their target module.
///
/// A bare reference needs `Default`, which a module with constructor
/// parameters cannot be assumed to provide; an argument list must match
/// the constructor's arity.
fn reference_problems(module: &ModuleDescriptor, graph: &ModuleGraph<'_>) -> Vec<Diagnostic> {
    let mut problems = Vec::new();
    for reference in &module.references {
        let Some(target) = graph.get(&reference.module.full_name()) else {
            continue;
        };
        if reference.arguments.is_empty() && target.is_parameterized() {
            problems.push(Diagnostic::error(
                &module.source_file,
                module.line,
                format!(
                    "module {} depends on {} without arguments, but its constructor takes {}",
                    module.id(),
                    target.id(),
                    target.constructor.len()
                ),
            ));
        } else if !reference.arguments.is_empty()
            && reference.arguments.len() != target.constructor.len()
        {
            problems.push(Diagnostic::error(
                &module.source_file,
                module.line,
                format!(
                    "module {} passes {} arguments to {}, whose constructor takes {}",
                    module.id(),
                    reference.arguments.len(),
                    target.id(),
                    target.constructor.len()
                ),
            ));
        }
        for property in &reference.properties {
            if !target.properties.iter().any(|p| p.name == property.name) {
                problems.push(Diagnostic::error(
                    &module.source_file,
                    module.line,
                    format!(
                        "module {} sets unknown property {} on {}",
                        module.id(),
                        property.name,
                        target.id()
                    ),
                ));
            }
        }
    }
    problems
}
