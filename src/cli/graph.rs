//! Graph command handler.

use clap::Parser;

use crate::di::FromRef;
use crate::discovery::Discovery;
use crate::error::GenError;
use crate::models::ModuleDescriptor;
use crate::services::{consolidate, GraphNode, ModuleGraph};

use super::{report, ProjectArgs};

/// Print the module application order below a module.
#[derive(Parser, Debug)]
pub struct GraphCommand {
    /// Module path (`crate::app::AppModule`) or short name (`AppModule`)
    pub module: String,

    #[command(flatten)]
    pub project: ProjectArgs,
}

impl GraphCommand {
    pub fn run(self) -> color_eyre::Result<i32> {
        let context = self.project.context()?;
        let discovery = Discovery::from_ref(&context).discover()?;
        let consolidated = consolidate(discovery.modules.clone());
        let graph = ModuleGraph::new(&consolidated.modules);

        let root = find_module(&consolidated.modules, &self.module)
            .ok_or_else(|| GenError::ModuleNotFound(self.module.clone()))?
            .id();

        for (position, node) in graph.flatten(&[root.as_str()]).iter().enumerate() {
            match node {
                GraphNode::Module(module) => println!("{:>3}. {}", position + 1, module.id()),
                GraphNode::External(id) => println!("{:>3}. {} (external)", position + 1, id),
            }
        }
        Ok(report(&discovery.diagnostics))
    }
}

/// Finds a module by full path, falling back to a unique short name.
fn find_module<'a>(modules: &'a [ModuleDescriptor], name: &str) -> Option<&'a ModuleDescriptor> {
    if let Some(module) = modules.iter().find(|m| m.id() == name) {
        return Some(module);
    }
    let mut matches = modules.iter().filter(|m| m.ty.name == name);
    match (matches.next(), matches.next()) {
        (Some(module), None) => Some(module),
        _ => None,
    }
}
