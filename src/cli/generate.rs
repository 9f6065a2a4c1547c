//! Generate command handler.

use std::path::PathBuf;

use clap::Parser;

use crate::di::FromRef;
use crate::discovery::Discovery;
use crate::services::Generator;

use super::{report, ProjectArgs};

/// Discover declarations and write generated units.
#[derive(Parser, Debug)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output directory, overriding the configured one
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl GenerateCommand {
    pub fn run(self) -> color_eyre::Result<i32> {
        let context = self.project.context()?;
        let discovery = Discovery::from_ref(&context).discover()?;
        let output = Generator::from_ref(&context).generate(&discovery)?;

        let out = self.out.unwrap_or_else(|| context.config.output_path());
        let written = output.write_to(&out)?;
        tracing::info!("Wrote {} files to {}", written, out.display());

        Ok(report(&output.diagnostics))
    }
}
