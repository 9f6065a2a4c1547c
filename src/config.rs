//! Project configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. Built-in defaults
//! 2. User config: `~/.config/wiregen/config.toml` (XDG) or platform config dir
//! 3. Project config: `<project>/wiregen.toml`
//! 4. Environment variables: `WIREGEN_*`
//!
//! # Example
//!
//! ```toml
//! default_registration = "try"
//! auto_generate_module = true
//! program_entry = "src/main.rs"
//! log_folder = "target/wiregen-logs"
//! log_level = "debug"
//! ```

use std::ops::Deref;
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::models::RegistrationType;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Name of the per-project config file.
pub const PROJECT_CONFIG_FILE: &str = "wiregen.toml";

/// Verbosity of the best-effort diagnostic log.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

/// Project-level generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Registration verb used when neither registration nor module declares one.
    pub default_registration: Option<RegistrationType>,
    /// Synthesize a whole-program module from the program entry file.
    pub auto_generate_module: bool,
    /// Namespace the synthesized program module lives in.
    pub root_namespace: String,
    /// Project root; relative paths below resolve against it.
    pub project_dir: PathBuf,
    /// Directory scanned for declarations.
    pub source_dir: PathBuf,
    /// File allowed to host the synthesized program module.
    pub program_entry: PathBuf,
    /// Directory generated units are written to.
    pub output_dir: PathBuf,
    /// Project default for emitting companion markers.
    pub generate_attribute: bool,
    /// Folder of the optional diagnostic log.
    pub log_folder: Option<PathBuf>,
    pub log_level: LogLevel,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            default_registration: None,
            auto_generate_module: false,
            root_namespace: "crate".to_string(),
            project_dir: PathBuf::from("."),
            source_dir: PathBuf::from("src"),
            program_entry: PathBuf::from("src/main.rs"),
            output_dir: PathBuf::from("target/wiregen"),
            generate_attribute: false,
            log_folder: None,
            log_level: LogLevel::default(),
        }
    }
}

impl ProjectConfig {
    /// Load config for a project with layered resolution (defaults → user → project → env).
    pub fn load(project_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let project_dir = project_dir.as_ref();
        let defaults = ProjectConfig {
            project_dir: project_dir.to_path_buf(),
            ..ProjectConfig::default()
        };

        Figment::from(Serialized::defaults(defaults))
            .merge(Toml::file(Self::user_config_path()))
            .merge(Toml::file(project_dir.join(PROJECT_CONFIG_FILE)))
            .merge(Env::prefixed("WIREGEN_"))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Scanned source directory, resolved against the project directory.
    pub fn source_path(&self) -> PathBuf {
        self.resolve(&self.source_dir)
    }

    /// Program entry file, resolved against the project directory.
    pub fn program_entry_path(&self) -> PathBuf {
        self.resolve(&self.program_entry)
    }

    /// Output directory, resolved against the project directory.
    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }

    /// Diagnostic log folder, resolved against the project directory.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_folder.as_ref().map(|folder| self.resolve(folder))
    }

    /// Whether a file is the designated program entry.
    pub fn is_program_entry(&self, file: &Path) -> bool {
        let entry = self.program_entry_path();
        file == entry || file == self.program_entry || file.ends_with(&self.program_entry)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }

    /// User config path: ~/.config/wiregen/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("wiregen").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("wiregen").join("config.toml"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_files() {
        figment::Jail::expect_with(|jail| {
            let config = ProjectConfig::load(jail.directory()).expect("load");
            assert_eq!(config.default_registration, None);
            assert!(!config.auto_generate_module);
            assert_eq!(config.root_namespace, "crate");
            assert_eq!(config.project_dir, jail.directory());
            assert_eq!(config.source_path(), jail.directory().join("src"));
            Ok(())
        });
    }

    #[test]
    fn test_project_file_then_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                PROJECT_CONFIG_FILE,
                r#"
                default_registration = "try"
                auto_generate_module = true
                log_level = "debug"
                "#,
            )?;
            jail.set_env("WIREGEN_DEFAULT_REGISTRATION", "replace");

            let config = ProjectConfig::load(jail.directory()).expect("load");
            assert_eq!(
                config.default_registration,
                Some(RegistrationType::Replace)
            );
            assert!(config.auto_generate_module);
            assert_eq!(config.log_level, LogLevel::Debug);
            Ok(())
        });
    }

    #[test]
    fn test_is_program_entry() {
        let config = ProjectConfig {
            project_dir: PathBuf::from("/work/app"),
            ..ProjectConfig::default()
        };
        assert!(config.is_program_entry(Path::new("/work/app/src/main.rs")));
        assert!(config.is_program_entry(Path::new("src/main.rs")));
        assert!(!config.is_program_entry(Path::new("/work/app/src/bin/tool.rs")));
    }
}
