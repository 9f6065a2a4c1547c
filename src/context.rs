//! Root context the generator's services are resolved from.

use std::path::Path;
use std::sync::Arc;

use crate::config::{ConfigError, ProjectConfig};
use crate::di::Context as ContextDerive;
use crate::diagnostics::{CancellationToken, DiagnosticLog};

/// Shared collaborators of one generation session.
///
/// `#[derive(Context)]` makes every field extractable with `FromRef`, so
/// services deriving `FromContext` are built straight from it.
#[derive(ContextDerive, Clone)]
pub struct GeneratorContext {
    /// Effective project configuration.
    pub config: Arc<ProjectConfig>,
    /// Best-effort diagnostic log.
    pub log: DiagnosticLog,
    /// Cancellation checked per file and per module.
    pub cancel: CancellationToken,
}

impl GeneratorContext {
    pub fn new(config: ProjectConfig) -> Self {
        let log = DiagnosticLog::from_config(&config);
        Self {
            config: Arc::new(config),
            log,
            cancel: CancellationToken::new(),
        }
    }

    /// Loads the layered configuration of a project.
    pub fn load(project_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self::new(ProjectConfig::load(project_dir)?))
    }

    /// Replaces the cancellation token, e.g. with one owned by a host.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}
