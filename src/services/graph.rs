//! Generation-time module dependency graph.
//!
//! Modules are stored in an arena indexed by identity string; edges are the
//! identity strings of `depends_on` references followed by additional
//! modules. The walk mirrors the runtime walker in [`crate::runtime`]: a
//! node is placed at the front of the result the first time it is reached,
//! then its references are walked. Nodes already placed are never revisited,
//! which makes cycles terminate.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::models::ModuleDescriptor;

/// A node produced by flattening the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphNode<'a> {
    /// A module declared in the scanned sources.
    Module(&'a ModuleDescriptor),
    /// A referenced module that is not part of this compilation.
    External(&'a str),
}

impl<'a> GraphNode<'a> {
    pub fn id(&self) -> String {
        match self {
            GraphNode::Module(module) => module.id(),
            GraphNode::External(id) => (*id).to_string(),
        }
    }
}

/// Arena of canonical modules keyed by identity.
#[derive(Debug)]
pub struct ModuleGraph<'a> {
    modules: Vec<&'a ModuleDescriptor>,
    index: HashMap<String, usize>,
    edges: Vec<Vec<String>>,
}

impl<'a> ModuleGraph<'a> {
    /// Builds the arena. Modules must already be consolidated.
    pub fn new(modules: &'a [ModuleDescriptor]) -> Self {
        let mut graph = Self {
            modules: Vec::with_capacity(modules.len()),
            index: HashMap::with_capacity(modules.len()),
            edges: Vec::with_capacity(modules.len()),
        };
        for module in modules {
            graph.index.insert(module.id(), graph.modules.len());
            graph.edges.push(module.dependency_ids().collect());
            graph.modules.push(module);
        }
        graph
    }

    pub fn get(&self, id: &str) -> Option<&'a ModuleDescriptor> {
        self.index.get(id).map(|&i| self.modules[i])
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Outgoing edges of a module, in declaration order.
    pub fn edges(&self, id: &str) -> &[String] {
        self.index
            .get(id)
            .map(|&i| self.edges[i].as_slice())
            .unwrap_or(&[])
    }

    /// References that point outside the compilation, as `(from, to)` pairs.
    pub fn external_references(&self) -> Vec<(&'a ModuleDescriptor, &str)> {
        let mut missing = Vec::new();
        for (i, module) in self.modules.iter().enumerate() {
            for target in &self.edges[i] {
                if !self.index.contains_key(target) {
                    missing.push((*module, target.as_str()));
                }
            }
        }
        missing
    }

    /// Flattens the transitive closure of `roots` into application order.
    ///
    /// Roots are walked in order; each walk places newly reached nodes at
    /// the front of the shared result.
    pub fn flatten<'g>(&'g self, roots: &[&'g str]) -> Vec<GraphNode<'g>> {
        let mut visited: HashSet<&'g str> = HashSet::new();
        let mut order: VecDeque<&'g str> = VecDeque::new();
        for root in roots {
            self.walk(root, &mut visited, &mut order);
        }
        order
            .into_iter()
            .map(|id| match self.get(id) {
                Some(module) => GraphNode::Module(module),
                None => GraphNode::External(id),
            })
            .collect()
    }

    fn walk<'g>(
        &'g self,
        id: &'g str,
        visited: &mut HashSet<&'g str>,
        order: &mut VecDeque<&'g str>,
    ) {
        if !visited.insert(id) {
            return;
        }
        order.push_front(id);
        for target in self.edges(id) {
            self.walk(target.as_str(), visited, order);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModuleReference, TypeName};

    fn module(name: &str, refs: &[&str]) -> ModuleDescriptor {
        let mut m = ModuleDescriptor::new(TypeName::new("crate", name), "src/lib.rs");
        m.references = refs
            .iter()
            .map(|r| ModuleReference::new(TypeName::new("crate", *r)))
            .collect();
        m
    }

    fn ids(nodes: &[GraphNode<'_>]) -> Vec<String> {
        nodes.iter().map(GraphNode::id).collect()
    }

    #[test]
    fn test_cycle_terminates_with_front_insertion() {
        let modules = vec![module("A", &["B"]), module("B", &["A"])];
        let graph = ModuleGraph::new(&modules);
        assert_eq!(ids(&graph.flatten(&["crate::A"])), vec!["crate::B", "crate::A"]);
    }

    #[test]
    fn test_shared_dependency_appears_once() {
        let modules = vec![
            module("Combined", &["TestModule", "TestModule2"]),
            module("TestModule", &[]),
            module("TestModule2", &["TestModule"]),
        ];
        let graph = ModuleGraph::new(&modules);
        assert_eq!(
            ids(&graph.flatten(&["crate::Combined"])),
            vec!["crate::TestModule2", "crate::TestModule", "crate::Combined"]
        );
    }

    #[test]
    fn test_additional_modules_walked_after_references() {
        let mut program = module("ProgramModule", &["A"]);
        program.additional_modules = vec![TypeName::new("crate", "B")];
        let modules = vec![program, module("A", &[]), module("B", &[])];
        let graph = ModuleGraph::new(&modules);
        assert_eq!(
            ids(&graph.flatten(&["crate::ProgramModule"])),
            vec!["crate::B", "crate::A", "crate::ProgramModule"]
        );
    }

    #[test]
    fn test_external_reference_is_a_leaf() {
        let modules = vec![module("A", &["Missing"])];
        let graph = ModuleGraph::new(&modules);
        let nodes = graph.flatten(&["crate::A"]);
        assert_eq!(nodes[0], GraphNode::External("crate::Missing"));
        let external = graph.external_references();
        assert_eq!(external.len(), 1);
        assert_eq!(external[0].0.id(), "crate::A");
        assert_eq!(external[0].1, "crate::Missing");
    }

    #[test]
    fn test_multiple_roots_share_visited_set() {
        let modules = vec![module("A", &["C"]), module("B", &["C"]), module("C", &[])];
        let graph = ModuleGraph::new(&modules);
        assert_eq!(
            ids(&graph.flatten(&["crate::A", "crate::B"])),
            vec!["crate::B", "crate::C", "crate::A"]
        );
    }
}
