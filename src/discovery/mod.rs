//! Source discovery: scans Rust sources for module and service declarations.
//!
//! Files are scanned in sorted path order and parsed with `syn`. Each file
//! contributes syntax facts; descriptors are built once every file is known
//! so trait impls, constructors and factories can live in any file.

mod analyze;
mod attributes;
mod namespace;
mod scanner;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use walkdir::WalkDir;

pub use analyze::{analyze, Analysis};
pub use attributes::{attribute_kind, AttributeKind, ModuleArgs, ServiceArgs};
pub use namespace::{file_namespace, PathResolver, Scope};
pub use scanner::FileFacts;

use crate::codegen::naming::GENERATED_SUFFIX;
use crate::config::ProjectConfig;
use crate::context::GeneratorContext;
use crate::di::FromContext;
use crate::diagnostics::{CancellationToken, Diagnostic, DiagnosticLog};
use crate::error::GenError;
use crate::models::{ModuleDescriptor, ServiceDescriptor};

/// Everything discovered in one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryOutput {
    /// One pair per module declaration occurrence.
    pub modules: Vec<(ModuleDescriptor, ProjectConfig)>,
    pub services: Vec<ServiceDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
    /// Number of files scanned.
    pub files: usize,
}

impl DiscoveryOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Scans the configured source directory.
#[derive(FromContext, Clone)]
#[from_context(Context = GeneratorContext)]
pub struct Discovery {
    config: Arc<ProjectConfig>,
    log: DiagnosticLog,
    cancel: CancellationToken,
}

impl Discovery {
    /// `*.rs` files below the source directory, in sorted path order.
    ///
    /// Generated units are skipped so checked-in output is never scanned.
    pub fn source_files(&self) -> Result<Vec<PathBuf>, GenError> {
        let root = self.config.source_path();
        let mut files = Vec::new();
        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = entry.map_err(|err| GenError::Io(err.into()))?;
            let path = entry.path();
            let generated = path.to_string_lossy().ends_with(GENERATED_SUFFIX);
            if entry.file_type().is_file()
                && path.extension().is_some_and(|ext| ext == "rs")
                && !generated
            {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }

    /// Reads and scans every source file.
    pub fn discover(&self) -> Result<DiscoveryOutput, GenError> {
        let root = self.config.source_path();
        tracing::info!("Scanning {}", root.display());

        let mut sources = Vec::new();
        for path in self.source_files()? {
            self.cancel.check()?;
            let source = std::fs::read_to_string(&path).map_err(|source| GenError::ReadFile {
                path: path.clone(),
                source,
            })?;
            sources.push((path, source));
        }
        self.discover_sources(sources)
    }

    /// Scans in-memory sources given as `(path, text)` pairs.
    ///
    /// A file that fails to parse becomes an error diagnostic; the other
    /// files are still scanned.
    pub fn discover_sources(
        &self,
        sources: Vec<(PathBuf, String)>,
    ) -> Result<DiscoveryOutput, GenError> {
        let root = self.config.source_path();
        let mut facts = Vec::with_capacity(sources.len());
        let mut diagnostics = Vec::new();

        for (path, source) in &sources {
            self.cancel.check()?;
            let namespace = file_namespace(
                &self.config.root_namespace,
                relative_to(path, &root, &self.config.source_dir),
            );
            match syn::parse_file(source) {
                Ok(file) => facts.push(FileFacts::collect(path, &namespace, &file)),
                Err(err) => {
                    let message = format!("Failed to parse {}: {}", path.display(), err);
                    self.log.error(&message);
                    diagnostics.push(Diagnostic::error(path, scanner::line_of(err.span()), message));
                }
            }
        }

        let analysis = analyze(&facts, &self.config);
        diagnostics.extend(analysis.diagnostics);
        for diagnostic in &diagnostics {
            tracing::warn!("{}", diagnostic);
            self.log.warn(&diagnostic.to_string());
        }

        let config = ProjectConfig::clone(&self.config);
        let output = DiscoveryOutput {
            modules: analysis
                .modules
                .into_iter()
                .map(|module| (module, config.clone()))
                .collect(),
            services: analysis.services,
            diagnostics,
            files: sources.len(),
        };
        tracing::info!(
            "Discovered {} modules and {} services in {} files",
            output.modules.len(),
            output.services.len(),
            output.files
        );
        self.log.info(&format!(
            "discovered {} modules, {} services",
            output.modules.len(),
            output.services.len()
        ));
        Ok(output)
    }
}

/// Path of a source file below the source directory.
fn relative_to<'p>(path: &'p Path, root: &Path, source_dir: &Path) -> &'p Path {
    path.strip_prefix(root)
        .or_else(|_| path.strip_prefix(source_dir))
        .ok()
        .or_else(|| path.file_name().map(Path::new))
        .unwrap_or(path)
}
