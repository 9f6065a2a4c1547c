//! Generation services: consolidation, graph walking, registration
//! resolution and emission, and the pipeline that runs them per module.

mod consolidate;
mod emitter;
mod generator;
mod graph;
mod resolver;

pub use consolidate::{consolidate, ConsolidatedModules};
pub use emitter::emit_registrations;
pub use generator::{
    generate_module, CacheStats, GenerationCache, GenerationOutput, Generator, ModuleInput,
    ModuleOutput,
};
pub use graph::{GraphNode, ModuleGraph};
pub use resolver::{
    resolve_module, ResolvedImplementation, ResolvedModule, ResolvedRegistration,
};
