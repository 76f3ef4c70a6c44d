//! Resolution engine: variant inheritance merging, dependency graph
//! construction with cycle detection and deterministic topological ordering,
//! and emission of the final build plan.

pub mod emit;
pub mod graph;
pub mod variant;
