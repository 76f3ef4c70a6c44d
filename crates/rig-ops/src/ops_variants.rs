//! Operation: list variants with their inheritance lineage.

use std::path::Path;

use rig_core::schema::OptionSchema;
use rig_resolver::variant::{self, ResolvedVariant};

/// Resolve every variant of a descriptor.
pub fn variants(
    descriptor_path: &Path,
    schema: &OptionSchema,
) -> miette::Result<Vec<ResolvedVariant>> {
    let descriptor = crate::load_validated(descriptor_path, schema)?;
    Ok(variant::resolve_variants(&descriptor, schema)?)
}

/// One line per variant: `release  base -> release  (signing: upload)`.
pub fn format_variants(variants: &[ResolvedVariant]) -> String {
    let width = variants.iter().map(|v| v.name.len()).max().unwrap_or(0);
    let mut output = String::new();
    for v in variants {
        output.push_str(&format!("{:<width$}  {}", v.name, v.lineage.join(" -> ")));
        if let Some(signing) = &v.signing_config {
            output.push_str(&format!("  (signing: {})", signing.name));
        }
        output.push('\n');
    }
    output
}
