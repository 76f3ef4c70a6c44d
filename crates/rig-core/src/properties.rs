use std::collections::BTreeMap;
use std::path::Path;

use rig_util::errors::{Result, RigError};

/// Name of the env file looked up next to a descriptor.
pub const ENV_FILE_NAME: &str = ".rig.env";

/// Loads a `.rig.env` file (shell-style `KEY=value` format).
///
/// `.rig.env` holds machine-local values (SDK locations, signing passwords,
/// CI-provided version codes) that descriptors pull in through `${env:VAR}`.
/// A missing file is an empty map.
pub fn load_env_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    if !path.is_file() {
        return Ok(map);
    }
    let content = std::fs::read_to_string(path).map_err(RigError::Io)?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = trimmed.split_once('=') {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            map.insert(key.trim().to_string(), value.to_string());
        }
    }
    Ok(map)
}

/// Result of [`interpolate`]: the substituted text and the variables that
/// resolved to nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolated {
    pub text: String,
    pub missing: Vec<String>,
}

/// Substitute `${env:VAR}` references in descriptor text.
///
/// Values come from `overrides` (the `.rig.env` map) first, then the process
/// environment. Unknown variables become empty strings and are listed in
/// [`Interpolated::missing`]. Substituted values are not rescanned.
pub fn interpolate(input: &str, overrides: &BTreeMap<String, String>) -> Interpolated {
    const OPEN: &str = "${env:";

    let mut text = String::with_capacity(input.len());
    let mut missing = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find('}') else {
            break;
        };
        text.push_str(&rest[..start]);
        let key = &after[..end];
        match overrides
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
        {
            Some(value) => text.push_str(&value),
            None => {
                if !missing.iter().any(|m| m == key) {
                    missing.push(key.to_string());
                }
            }
        }
        rest = &after[end + 1..];
    }
    text.push_str(rest);

    Interpolated { text, missing }
}
