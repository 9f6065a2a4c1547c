//! Build-time diagnostics, the best-effort diagnostic log and cancellation.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::config::{LogLevel, ProjectConfig};
use crate::error::GenError;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// A message pointing at a declaration in the scanned sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub path: PathBuf,
    /// 1-indexed line, 0 when the whole file is concerned.
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn error(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    pub fn warning(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Converts a generation error into an error diagnostic for a file.
    pub fn from_error(path: &Path, err: &GenError) -> Self {
        match err {
            GenError::MalformedDeclaration {
                path,
                line,
                message,
            } => Self::error(path.clone(), *line, message.clone()),
            GenError::Parse { path, message } => Self::error(path.clone(), 0, message.clone()),
            other => Self::error(path, other.line().unwrap_or(0), other.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        if self.line > 0 {
            write!(
                f,
                "{}: {}:{}: {}",
                label,
                self.path.display(),
                self.line,
                self.message
            )
        } else {
            write!(f, "{}: {}: {}", label, self.path.display(), self.message)
        }
    }
}

/// Optional append-only log file for troubleshooting generation.
///
/// Every write is best-effort: failures are swallowed and never change
/// generation output.
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    file: Option<PathBuf>,
    level: LogLevel,
}

impl DiagnosticLog {
    /// File name used inside the configured log folder.
    pub const FILE_NAME: &'static str = "wiregen.log";

    pub fn new(folder: Option<PathBuf>, level: LogLevel) -> Self {
        Self {
            file: folder.map(|folder| folder.join(Self::FILE_NAME)),
            level,
        }
    }

    pub fn from_config(config: &ProjectConfig) -> Self {
        Self::new(config.log_path(), config.log_level)
    }

    /// A log that never writes.
    pub fn disabled() -> Self {
        Self::new(None, LogLevel::Error)
    }

    pub fn path(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn error(&self, message: &str) {
        self.write(LogLevel::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.write(LogLevel::Warn, message);
    }

    pub fn info(&self, message: &str) {
        self.write(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.write(LogLevel::Debug, message);
    }

    fn write(&self, level: LogLevel, message: &str) {
        let Some(file) = &self.file else {
            return;
        };
        if level > self.level {
            return;
        }
        let _ = Self::append(file, level, message);
    }

    fn append(file: &Path, level: LogLevel, message: &str) -> std::io::Result<()> {
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut handle = OpenOptions::new().create(true).append(true).open(file)?;
        writeln!(
            handle,
            "{} [{:?}] {}",
            chrono::Utc::now().to_rfc3339(),
            level,
            message
        )
    }
}

/// Cooperative cancellation flag shared between a host and a generation pass.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns `Err(GenError::Cancelled)` once cancellation was requested.
    pub fn check(&self) -> Result<(), GenError> {
        if self.is_cancelled() {
            Err(GenError::Cancelled)
        } else {
            Ok(())
        }
    }
}
