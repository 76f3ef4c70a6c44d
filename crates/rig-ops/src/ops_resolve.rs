//! Operation: resolve a descriptor into a build plan.

use std::path::{Path, PathBuf};

use rig_core::config::GlobalConfig;
use rig_core::plan::{PlanFormat, ResolvedPlan};
use rig_core::schema::OptionSchema;
use rig_resolver::emit;
use rig_resolver::graph::DependencyGraph;
use rig_resolver::variant::{self, ResolvedVariant};
use rig_util::errors::RigError;
use rig_util::hash;

/// Options for `rig resolve`.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Resolve only this variant; every variant when `None`.
    pub variant: Option<String>,
    /// Schema file overriding the configured default.
    pub schema: Option<PathBuf>,
    /// Output format overriding the configured default.
    pub format: Option<PlanFormat>,
    /// Write the plan here instead of stdout.
    pub output: Option<PathBuf>,
}

/// Run the full pipeline and return the plan without writing it anywhere.
///
/// Parse, validate, resolve variants, order dependencies, emit. Any failure
/// aborts the run; no partial plan is produced.
pub fn plan(
    descriptor_path: &Path,
    schema: &OptionSchema,
    only_variant: Option<&str>,
) -> miette::Result<ResolvedPlan> {
    let descriptor = crate::load_validated(descriptor_path, schema)?;
    tracing::debug!(
        "resolving {} ({} variant(s) declared, {} dependencies)",
        descriptor_path.display(),
        descriptor.variants.len(),
        descriptor.dependencies.len()
    );

    let variants: Vec<ResolvedVariant> = match only_variant {
        Some(name) => {
            let known = variant::effective_variants(&descriptor, schema);
            if !known.iter().any(|v| v.name == name) {
                return Err(RigError::UnresolvedReference {
                    kind: "variant",
                    name: name.to_string(),
                    referenced_by: "--variant".to_string(),
                }
                .into());
            }
            vec![variant::resolve_variant(&descriptor, schema, name)?]
        }
        None => variant::resolve_variants(&descriptor, schema)?,
    };

    let graph = DependencyGraph::build(&descriptor.dependencies)?;
    let order = graph.topological_order()?;
    tracing::debug!(
        "dependency order: {}",
        order.iter().map(|n| n.id.as_str()).collect::<Vec<_>>().join(", ")
    );

    let checksum = hash::sha256_file(descriptor_path).map_err(RigError::Io)?;
    let plan = emit::emit(&crate::display_name(descriptor_path), &variants, &order)?
        .with_source_checksum(checksum);
    tracing::info!("resolved plan {}", plan.fingerprint);
    Ok(plan)
}

/// Resolve the descriptor and write the plan to stdout or `--output`.
pub fn resolve(descriptor_path: &Path, opts: &ResolveOptions) -> miette::Result<()> {
    let config = GlobalConfig::load()?;
    let schema = crate::load_schema(opts.schema.as_deref(), &config)?;
    let format = match opts.format {
        Some(f) => f,
        None => match config.resolve.format.as_deref() {
            Some(name) => name.parse::<PlanFormat>()?,
            None => PlanFormat::default(),
        },
    };

    rig_util::progress::status("Resolving", &descriptor_path.display().to_string());
    let plan = plan(descriptor_path, &schema, opts.variant.as_deref())?;
    let rendered = plan.render(format)?;

    let summary = format!(
        "{} step(s), {} variant(s), fingerprint {}",
        plan.steps.len(),
        plan.variants.len(),
        hash::short_digest(&plan.fingerprint, 12)
    );
    match &opts.output {
        Some(path) => {
            rig_util::fs::write_atomic(path, &rendered).map_err(RigError::Io)?;
            rig_util::progress::status("Wrote", &path.display().to_string());
        }
        None => {
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
        }
    }
    rig_util::progress::status("Finished", &summary);
    Ok(())
}
