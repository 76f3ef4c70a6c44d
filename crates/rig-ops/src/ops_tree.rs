//! Operation: display the dependency tree.

use std::path::Path;

use rig_core::descriptor::Descriptor;
use rig_resolver::graph::DependencyGraph;
use rig_util::errors::RigError;

/// Options for `rig tree`.
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
    /// Show what requires this dependency instead of the full tree.
    pub inverted: Option<String>,
}

/// Render the dependency tree of a descriptor.
pub fn tree(descriptor_path: &Path, opts: &TreeOptions) -> miette::Result<String> {
    let descriptor = Descriptor::from_path(descriptor_path)?;
    let graph = DependencyGraph::build(&descriptor.dependencies)?;
    graph.topological_order()?;

    if let Some(id) = &opts.inverted {
        if graph.find(id).is_none() {
            return Err(RigError::UnresolvedReference {
                kind: "dependency",
                name: id.clone(),
                referenced_by: "--inverted".to_string(),
            }
            .into());
        }
        return Ok(graph.print_inverted_tree(id));
    }

    if graph.is_empty() {
        return Ok("No dependencies.\n".to_string());
    }
    Ok(graph.print_tree(opts.depth))
}
