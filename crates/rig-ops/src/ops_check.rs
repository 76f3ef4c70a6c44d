//! Operation: validate a descriptor without emitting a plan.

use std::path::Path;

use rig_core::descriptor::Descriptor;
use rig_core::schema::OptionSchema;
use rig_core::version::VersionConstraint;
use rig_resolver::graph::DependencyGraph;
use rig_resolver::variant;

/// What a successful check found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    pub options: usize,
    pub variants: Vec<String>,
    pub dependencies: usize,
    /// Non-fatal findings, such as snapshot dependency versions.
    pub warnings: Vec<String>,
}

/// Parse, validate and resolve everything a plan would need.
pub fn check(descriptor_path: &Path, schema: &OptionSchema) -> miette::Result<CheckSummary> {
    rig_util::progress::status("Checking", &descriptor_path.display().to_string());

    let descriptor = crate::load_validated(descriptor_path, schema)?;
    let variants = variant::resolve_variants(&descriptor, schema)?;
    tracing::debug!("resolved {} variant(s)", variants.len());
    let graph = DependencyGraph::build(&descriptor.dependencies)?;
    graph.topological_order()?;
    tracing::debug!("dependency graph of {} node(s) is acyclic", graph.len());

    let summary = CheckSummary {
        options: descriptor.options.len(),
        variants: variants.into_iter().map(|v| v.name).collect(),
        dependencies: graph.len(),
        warnings: snapshot_warnings(&descriptor),
    };

    for warning in &summary.warnings {
        rig_util::progress::status_warn("Warning", warning);
    }
    rig_util::progress::status(
        "Finished",
        &format!(
            "{} option(s), {} variant(s) [{}], {} dependenc{}",
            summary.options,
            summary.variants.len(),
            summary.variants.join(", "),
            summary.dependencies,
            if summary.dependencies == 1 { "y" } else { "ies" }
        ),
    );
    Ok(summary)
}

fn snapshot_warnings(descriptor: &Descriptor) -> Vec<String> {
    descriptor
        .dependencies
        .iter()
        .filter_map(|dep| {
            let version = dep.version.as_deref()?;
            match VersionConstraint::parse(version) {
                Ok(VersionConstraint::Exact(v)) if v.is_snapshot() => Some(format!(
                    "'{}' depends on snapshot version {v}; plans will not be reproducible",
                    dep.id
                )),
                _ => None,
            }
        })
        .collect()
}
