//! Inspect command handler.

use clap::Parser;

use crate::di::FromRef;
use crate::discovery::Discovery;

use super::{report, ProjectArgs};

/// Print discovered module and service descriptors as JSON.
#[derive(Parser, Debug)]
pub struct InspectCommand {
    #[command(flatten)]
    pub project: ProjectArgs,
}

impl InspectCommand {
    pub fn run(self) -> color_eyre::Result<i32> {
        let context = self.project.context()?;
        let discovery = Discovery::from_ref(&context).discover()?;
        println!("{}", serde_json::to_string_pretty(&discovery)?);
        Ok(report(&discovery.diagnostics))
    }
}
