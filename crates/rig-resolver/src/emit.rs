//! Plan emission: resolved variants plus ordered dependencies become a
//! [`ResolvedPlan`].

use rig_core::descriptor::{DependencyNode, SigningConfig};
use rig_core::plan::{PlanSigning, PlanStep, ResolvedPlan, VariantPlan};
use rig_util::errors::Result;

use crate::variant::ResolvedVariant;

/// Assemble the plan. `order` must already be topologically sorted.
pub fn emit(
    descriptor_name: &str,
    variants: &[ResolvedVariant],
    order: &[&DependencyNode],
) -> Result<ResolvedPlan> {
    let steps = order
        .iter()
        .enumerate()
        .map(|(i, node)| PlanStep {
            order: i + 1,
            id: node.id.clone(),
            kind: node.kind.clone(),
            version: node.version.clone(),
            requires: node.requires.clone(),
        })
        .collect();

    let variants = variants
        .iter()
        .map(|v| VariantPlan {
            name: v.name.clone(),
            lineage: v.lineage.clone(),
            signing_config: v.signing_config.as_ref().map(signing),
            options: v.options.clone(),
        })
        .collect();

    let plan = ResolvedPlan::new(descriptor_name, steps, variants)?;
    tracing::debug!(
        "emitted plan for {descriptor_name}: {} steps, {} variants",
        plan.steps.len(),
        plan.variants.len()
    );
    Ok(plan)
}

fn signing(config: &SigningConfig) -> PlanSigning {
    PlanSigning {
        name: config.name.clone(),
        store_file: config.store_file.clone(),
        key_alias: config.key_alias.clone(),
    }
}
