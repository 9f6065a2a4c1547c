//! CLI module for Wiregen.
//!
//! Subcommands:
//! - `generate`: Scan a project and write the generated units
//! - `graph`: Print the flattened module order below a module
//! - `inspect`: Print discovered descriptors as JSON

mod generate;
mod graph;
mod inspect;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

pub use generate::GenerateCommand;
pub use graph::GraphCommand;
pub use inspect::InspectCommand;

use crate::context::GeneratorContext;
use crate::diagnostics::Diagnostic;

/// Wiregen - compile-time dependency-injection module generator
#[derive(Parser)]
#[command(name = "wiregen")]
#[command(about = "Generates dependency-injection module registrations from annotated Rust sources")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Discover declarations and write generated units
    Generate(GenerateCommand),

    /// Print the module application order below a module
    Graph(GraphCommand),

    /// Print discovered module and service descriptors as JSON
    Inspect(InspectCommand),
}

impl App {
    /// Run the CLI application, returning the process exit code.
    pub fn run(self) -> color_eyre::Result<i32> {
        match self.command {
            Command::Generate(cmd) => cmd.run(),
            Command::Graph(cmd) => cmd.run(),
            Command::Inspect(cmd) => cmd.run(),
        }
    }
}

/// Project directory argument shared by the subcommands.
#[derive(clap::Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project root containing `wiregen.toml` and the sources
    #[arg(short, long, default_value = ".")]
    pub project: PathBuf,
}

impl ProjectArgs {
    fn context(&self) -> color_eyre::Result<GeneratorContext> {
        load_context(&self.project)
    }
}

fn load_context(project: &Path) -> color_eyre::Result<GeneratorContext> {
    let context = GeneratorContext::load(project)?;
    tracing::debug!(
        "Loaded configuration for {} (sources: {})",
        context.config.project_dir.display(),
        context.config.source_path().display()
    );
    Ok(context)
}

/// Prints diagnostics to stderr and returns the exit code they imply.
fn report(diagnostics: &[Diagnostic]) -> i32 {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic);
    }
    if diagnostics.iter().any(Diagnostic::is_error) {
        1
    } else {
        0
    }
}
