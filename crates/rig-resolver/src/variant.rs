//! Variant inheritance resolution.
//!
//! A variant's options are merged in this order, later layers winning per key:
//! schema defaults, top-level descriptor options, the root ancestor's
//! overrides, and so on down to the variant's own overrides.

use std::collections::{BTreeMap, HashSet};

use rig_core::descriptor::{Descriptor, SigningConfig, Variant};
use rig_core::schema::OptionSchema;
use rig_core::value::Value;
use rig_util::errors::{Result, RigError};

/// Names of the build types that exist when a descriptor declares neither.
pub const BUILTIN_BUILD_TYPES: [&str; 2] = ["debug", "release"];

/// Option that points a variant at a signing config.
pub const SIGNING_CONFIG_OPTION: &str = "signingConfig";

const DEBUGGABLE_OPTION: &str = "debuggable";

/// A variant with its inheritance chain flattened into one option map.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVariant {
    pub name: String,
    /// Root ancestor first, ending with this variant.
    pub lineage: Vec<String>,
    pub options: BTreeMap<String, Value>,
    pub signing_config: Option<SigningConfig>,
}

impl ResolvedVariant {
    /// The merged variant as a standalone definition with no base.
    pub fn into_variant(self) -> Variant {
        Variant {
            name: self.name,
            base: None,
            overrides: self.options,
        }
    }
}

/// Declared variants, preceded by the implicit `debug` and `release` build
/// types when the descriptor declares neither of them.
pub fn effective_variants(descriptor: &Descriptor, schema: &OptionSchema) -> Vec<Variant> {
    let declares_builtin = descriptor
        .variants
        .iter()
        .any(|v| BUILTIN_BUILD_TYPES.contains(&v.name.as_str()));
    if declares_builtin {
        return descriptor.variants.clone();
    }

    tracing::debug!("no debug/release variants declared; adding implicit build types");
    let mut variants = Vec::with_capacity(descriptor.variants.len() + 2);
    for name in BUILTIN_BUILD_TYPES {
        let mut variant = Variant::new(name);
        if schema.contains(DEBUGGABLE_OPTION) {
            variant = variant.with(DEBUGGABLE_OPTION, name == "debug");
        }
        variants.push(variant);
    }
    variants.extend(descriptor.variants.iter().cloned());
    variants
}

/// Walk base references from `name` up to its root ancestor.
///
/// Returns the chain root first.
///
/// # Errors
///
/// [`RigError::Cycle`] when the walk revisits a variant, naming the variants
/// on the loop in child-to-base order; [`RigError::UnresolvedReference`]
/// when a base is not declared.
pub fn lineage<'a>(variants: &'a [Variant], name: &str) -> Result<Vec<&'a Variant>> {
    let find = |n: &str| variants.iter().find(|v| v.name == n);

    let mut current = find(name).ok_or_else(|| RigError::UnresolvedReference {
        kind: "variant",
        name: name.to_string(),
        referenced_by: "variant selection".to_string(),
    })?;
    let mut chain: Vec<&Variant> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();

    loop {
        visited.insert(&current.name);
        chain.push(current);

        let Some(base) = current.base.as_deref() else {
            break;
        };
        if visited.contains(base) {
            let start = chain.iter().position(|v| v.name == base).unwrap_or(0);
            return Err(RigError::Cycle {
                kind: "variant",
                nodes: chain[start..].iter().map(|v| v.name.clone()).collect(),
            });
        }
        current = find(base).ok_or_else(|| RigError::UnresolvedReference {
            kind: "base variant",
            name: base.to_string(),
            referenced_by: current.name.clone(),
        })?;
    }

    chain.reverse();
    Ok(chain)
}

/// Resolve the variant called `name`.
pub fn resolve_variant(
    descriptor: &Descriptor,
    schema: &OptionSchema,
    name: &str,
) -> Result<ResolvedVariant> {
    let variants = effective_variants(descriptor, schema);
    resolve_in(&variants, descriptor, schema, name)
}

/// Resolve every variant, in declaration order (implicit build types first).
pub fn resolve_variants(
    descriptor: &Descriptor,
    schema: &OptionSchema,
) -> Result<Vec<ResolvedVariant>> {
    let variants = effective_variants(descriptor, schema);
    variants
        .iter()
        .map(|v| resolve_in(&variants, descriptor, schema, &v.name))
        .collect()
}

fn resolve_in(
    variants: &[Variant],
    descriptor: &Descriptor,
    schema: &OptionSchema,
    name: &str,
) -> Result<ResolvedVariant> {
    let chain = lineage(variants, name)?;

    let mut options: BTreeMap<String, Value> = schema
        .defaults()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    options.extend(descriptor.options.clone());
    for variant in &chain {
        options.extend(variant.overrides.clone());
    }

    let signing_config = match options.get(SIGNING_CONFIG_OPTION).and_then(Value::as_str) {
        Some(config) => Some(descriptor.signing_config(config).ok_or_else(|| {
            RigError::UnresolvedReference {
                kind: "signing config",
                name: config.to_string(),
                referenced_by: name.to_string(),
            }
        })?),
        None => None,
    };

    let lineage: Vec<String> = chain.iter().map(|v| v.name.clone()).collect();
    tracing::debug!(
        "variant '{name}': lineage {}, {} options",
        lineage.join(" <- "),
        options.len()
    );
    Ok(ResolvedVariant {
        name: name.to_string(),
        lineage,
        options,
        signing_config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rig_core::schema::{OptionSpec, OptionType};

    fn schema_with_debug() -> OptionSchema {
        let mut schema = OptionSchema::new();
        schema.insert("debug", OptionSpec::new(OptionType::Bool));
        schema
    }

    fn descriptor(variants: Vec<Variant>) -> Descriptor {
        Descriptor {
            variants,
            ..Descriptor::default()
        }
    }

    #[test]
    fn child_overrides_base() {
        let d = descriptor(vec![
            Variant::new("base").with("debug", true),
            Variant::new("release").extending("base").with("debug", false),
        ]);
        let resolved = resolve_variant(&d, &schema_with_debug(), "release").unwrap();
        assert_eq!(resolved.options["debug"], Value::Bool(false));
        assert_eq!(resolved.lineage, vec!["base", "release"]);
    }

    #[test]
    fn inherited_keys_survive() {
        let d = descriptor(vec![
            Variant::new("base").with("a", 1).with("b", 2),
            Variant::new("mid").extending("base").with("b", 3),
            Variant::new("leaf").extending("mid").with("c", 4),
        ]);
        let resolved = resolve_variant(&d, &OptionSchema::new(), "leaf").unwrap();
        assert_eq!(resolved.options["a"], Value::Integer(1));
        assert_eq!(resolved.options["b"], Value::Integer(3));
        assert_eq!(resolved.options["c"], Value::Integer(4));
        assert_eq!(resolved.lineage, vec!["base", "mid", "leaf"]);
    }

    #[test]
    fn layers_schema_defaults_then_top_level() {
        let mut schema = OptionSchema::new();
        schema
            .insert("minSdk", OptionSpec::new(OptionType::Integer).default_value(21))
            .insert("targetSdk", OptionSpec::new(OptionType::Integer).default_value(33));
        let mut d = descriptor(vec![Variant::new("debug").with("targetSdk", 35)]);
        d.options.insert("targetSdk".into(), Value::Integer(34));

        let resolved = resolve_variant(&d, &schema, "debug").unwrap();
        assert_eq!(resolved.options["minSdk"], Value::Integer(21));
        assert_eq!(resolved.options["targetSdk"], Value::Integer(35));
    }

    #[test]
    fn inheritance_cycle_is_named() {
        let d = descriptor(vec![
            Variant::new("a").extending("b"),
            Variant::new("b").extending("c"),
            Variant::new("c").extending("a"),
        ]);
        let err = resolve_variant(&d, &OptionSchema::new(), "a").unwrap_err();
        assert_eq!(err.to_string(), "Cyclic variant chain: a -> b -> c -> a");
    }

    #[test]
    fn cycle_reached_through_a_tail() {
        let d = descriptor(vec![
            Variant::new("leaf").extending("x"),
            Variant::new("x").extending("y"),
            Variant::new("y").extending("x"),
        ]);
        match resolve_variant(&d, &OptionSchema::new(), "leaf").unwrap_err() {
            RigError::Cycle { kind, nodes } => {
                assert_eq!(kind, "variant");
                assert_eq!(nodes, vec!["x", "y"]);
            }
            other => panic!("expected a cycle error, got {other}"),
        }
    }

    #[test]
    fn self_extension_is_a_cycle() {
        let d = descriptor(vec![Variant::new("me").extending("me")]);
        assert!(matches!(
            resolve_variant(&d, &OptionSchema::new(), "me"),
            Err(RigError::Cycle { .. })
        ));
    }

    #[test]
    fn unknown_base_is_unresolved() {
        let d = descriptor(vec![Variant::new("release").extending("missing")]);
        let err = resolve_variant(&d, &OptionSchema::new(), "release").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unresolved base variant 'missing' referenced by 'release'"
        );
    }

    #[test]
    fn implicit_build_types_when_none_declared() {
        let d = descriptor(vec![Variant::new("staging").extending("release")]);
        let schema = OptionSchema::android();
        let resolved = resolve_variants(&d, &schema).unwrap();
        let names: Vec<&str> = resolved.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["debug", "release", "staging"]);
        assert_eq!(resolved[0].options["debuggable"], Value::Bool(true));
        assert_eq!(resolved[1].options["debuggable"], Value::Bool(false));
        assert_eq!(resolved[2].lineage, vec!["release", "staging"]);
    }

    #[test]
    fn implicit_build_types_skip_unknown_debuggable() {
        let resolved = resolve_variants(&Descriptor::default(), &OptionSchema::new()).unwrap();
        assert_eq!(resolved.len(), 2);
        assert!(resolved.iter().all(|v| v.options.is_empty()));
    }

    #[test]
    fn declaring_release_disables_implicit_types() {
        let d = descriptor(vec![Variant::new("release")]);
        let names: Vec<String> = resolve_variants(&d, &OptionSchema::new())
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["release"]);
    }

    #[test]
    fn signing_config_falls_back_to_builtin_debug() {
        let d = descriptor(vec![Variant::new("release").with("signingConfig", "debug")]);
        let resolved = resolve_variant(&d, &OptionSchema::new(), "release").unwrap();
        assert_eq!(resolved.signing_config, Some(SigningConfig::debug()));
    }

    #[test]
    fn unknown_signing_config_is_unresolved() {
        let d = descriptor(vec![Variant::new("release").with("signingConfig", "upload")]);
        let err = resolve_variant(&d, &OptionSchema::new(), "release").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unresolved signing config 'upload' referenced by 'release'"
        );
    }

    #[test]
    fn resolution_is_idempotent() {
        let d = descriptor(vec![
            Variant::new("base").with("debug", true).with("signingConfig", "debug"),
            Variant::new("release").extending("base").with("debug", false),
        ]);
        let schema = schema_with_debug();
        let first = resolve_variant(&d, &schema, "release").unwrap();

        let merged = descriptor(vec![first.clone().into_variant()]);
        let second = resolve_variant(&merged, &schema, "release").unwrap();
        assert_eq!(second.options, first.options);
        assert_eq!(second.signing_config, first.signing_config);
    }

    #[test]
    fn unknown_variant_name() {
        let d = descriptor(vec![Variant::new("release")]);
        assert!(matches!(
            resolve_variant(&d, &OptionSchema::new(), "beta"),
            Err(RigError::UnresolvedReference { kind: "variant", .. })
        ));
    }
}
