//! Option validation against an [`OptionSchema`].
//!
//! Validation is a pure function of the descriptor and schema. It never stops
//! at the first problem: every violation across top-level options, variant
//! overrides and dependency constraints is collected into one
//! [`RigError::Validation`].

use std::collections::BTreeMap;

use rig_util::errors::{Result, RigError};

use crate::descriptor::Descriptor;
use crate::schema::{OptionSchema, OptionSpec, OptionType};
use crate::value::Value;
use crate::version::{Version, VersionConstraint};

/// Check every option of `descriptor` against `schema` and return the
/// descriptor with its values coerced to their declared types.
pub fn validate(descriptor: &Descriptor, schema: &OptionSchema) -> Result<Descriptor> {
    let mut violations = Vec::new();
    let mut validated = descriptor.clone();

    for (name, spec) in &schema.options {
        if let Some(Err(e)) = spec.default.as_ref().map(|d| coerce(d, spec)) {
            violations.push(format!("default of option '{name}': {e}"));
        }
    }

    validated.options = check_options(&descriptor.options, schema, "", &mut violations);

    for (name, spec) in &schema.options {
        if spec.required && spec.default.is_none() && !descriptor.options.contains_key(name) {
            violations.push(format!("missing required option '{name}'"));
        }
    }

    for variant in &mut validated.variants {
        let scope = format!("variant '{}': ", variant.name);
        variant.overrides = check_options(&variant.overrides, schema, &scope, &mut violations);
    }

    for dep in &descriptor.dependencies {
        if let Some(version) = &dep.version {
            if let Err(e) = VersionConstraint::parse(version) {
                violations.push(format!(
                    "dependency '{}': invalid version constraint '{version}': {e}",
                    dep.id
                ));
            }
        }
    }

    if violations.is_empty() {
        tracing::debug!(
            "validated {} options across {} variants",
            validated.options.len(),
            validated.variants.len()
        );
        Ok(validated)
    } else {
        Err(RigError::Validation { violations })
    }
}

fn check_options(
    options: &BTreeMap<String, Value>,
    schema: &OptionSchema,
    scope: &str,
    violations: &mut Vec<String>,
) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    for (name, value) in options {
        let Some(spec) = schema.get(name) else {
            violations.push(format!("{scope}unknown option '{name}'"));
            continue;
        };
        match coerce(value, spec) {
            Ok(coerced) => {
                out.insert(name.clone(), coerced);
            }
            Err(e) => violations.push(format!("{scope}option '{name}': {e}")),
        }
    }
    out
}

/// Coerce `value` to the type declared by `spec` and check its constraints.
///
/// Accepted coercions: `"21"` to an integer, `"true"`/`"false"` to a bool,
/// an integer to a string or version, and a scalar to a one-element list.
pub fn coerce(value: &Value, spec: &OptionSpec) -> std::result::Result<Value, String> {
    let coerced = match (spec.kind, value) {
        (OptionType::Integer, Value::Integer(_)) => value.clone(),
        (OptionType::Integer, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| format!("expected integer, got string {value}"))?,

        (OptionType::Bool, Value::Bool(_)) => value.clone(),
        (OptionType::Bool, Value::String(s)) => match s.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => return Err(format!("expected bool, got string {value}")),
        },

        (OptionType::String, Value::String(_)) => value.clone(),
        (OptionType::String, Value::Integer(n)) => Value::String(n.to_string()),

        (OptionType::Version, Value::String(s)) => {
            Version::parse(s)?;
            value.clone()
        }
        (OptionType::Version, Value::Integer(n)) => {
            let text = n.to_string();
            Version::parse(&text)?;
            Value::String(text)
        }

        (OptionType::List, Value::List(_)) => value.clone(),
        (OptionType::List, scalar) => Value::List(vec![scalar.clone()]),

        (kind, other) => {
            return Err(format!("expected {kind}, got {} {other}", other.type_name()));
        }
    };

    check_constraints(&coerced, spec)?;
    Ok(coerced)
}

fn check_constraints(value: &Value, spec: &OptionSpec) -> std::result::Result<(), String> {
    if let Value::Integer(n) = value {
        if let Some(min) = spec.min.filter(|min| n < min) {
            return Err(format!("{n} is below the minimum {min}"));
        }
        if let Some(max) = spec.max.filter(|max| n > max) {
            return Err(format!("{n} is above the maximum {max}"));
        }
    }

    if spec.allowed.is_empty() {
        return Ok(());
    }
    let items = match value {
        Value::List(items) => items.as_slice(),
        scalar => std::slice::from_ref(scalar),
    };
    for item in items {
        if !spec.allowed.contains(item) {
            return Err(format!(
                "{item} is not one of {}",
                Value::List(spec.allowed.clone())
            ));
        }
    }
    Ok(())
}
