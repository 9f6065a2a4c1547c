//! Generator error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while discovering declarations or generating registration code.
#[derive(Error, Debug)]
pub enum GenError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    // Declaration errors
    #[error("{path}:{line}: {message}")]
    MalformedDeclaration {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Unknown service lifetime attribute: {0}")]
    UnknownLifetime(String),

    #[error("{0}")]
    UnknownRegistrationType(String),

    #[error("Factory '{factory}' referenced by {service} was not found")]
    UnknownFactory { service: String, factory: String },

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    // Pipeline errors
    #[error("Generation cancelled")]
    Cancelled,

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl GenError {
    /// Source line the error points at, if it refers to a declaration.
    pub fn line(&self) -> Option<usize> {
        match self {
            GenError::MalformedDeclaration { line, .. } => Some(*line),
            _ => None,
        }
    }
}
