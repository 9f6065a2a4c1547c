//! Module consolidation: one canonical descriptor per module identity.
//!
//! A module can be discovered more than once (repeated scans, synthesized
//! program modules next to user-declared ones). Consolidation groups the
//! descriptors by `(namespace, short name)` and picks one per group:
//!
//! - synthesized descriptors are dropped when auto-generation is disabled,
//!   or when they do not come from the designated program entry file
//! - the first user-declared descriptor of a group wins
//! - otherwise the first descriptor of the group wins
//!
//! Groups keep the order in which their identity was first seen.

use std::collections::HashMap;

use crate::config::ProjectConfig;
use crate::models::ModuleDescriptor;

/// Canonical modules and the configuration shared by them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConsolidatedModules {
    pub modules: Vec<ModuleDescriptor>,
    pub config: ProjectConfig,
}

impl ConsolidatedModules {
    /// Looks up a canonical module by full path.
    pub fn get(&self, id: &str) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|m| m.id() == id)
    }
}

/// Reduces discovered `(module, config)` pairs to canonical descriptors.
///
/// The shared configuration is the one attached to the first pair, or the
/// default configuration when nothing was discovered.
pub fn consolidate(entries: Vec<(ModuleDescriptor, ProjectConfig)>) -> ConsolidatedModules {
    let config = entries
        .first()
        .map(|(_, config)| config.clone())
        .unwrap_or_default();

    let mut order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), Vec<ModuleDescriptor>> = HashMap::new();

    for (module, module_config) in entries {
        if module.auto_generated
            && (!module_config.auto_generate_module
                || !module_config.is_program_entry(&module.source_file))
        {
            tracing::debug!(
                "Skipping synthesized module {} from {}",
                module.id(),
                module.source_file.display()
            );
            continue;
        }

        let key = (module.ty.namespace.clone(), module.ty.name.clone());
        let group = groups.entry(key.clone()).or_default();
        if group.is_empty() {
            order.push(key);
        }
        group.push(module);
    }

    let modules = order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .filter_map(pick_canonical)
        .collect();

    ConsolidatedModules { modules, config }
}

fn pick_canonical(group: Vec<ModuleDescriptor>) -> Option<ModuleDescriptor> {
    if group.len() > 1 {
        tracing::debug!(
            "Consolidating {} declarations of module {}",
            group.len(),
            group[0].id()
        );
    }
    let preferred = group.iter().position(|m| !m.auto_generated).unwrap_or(0);
    group.into_iter().nth(preferred)
}
