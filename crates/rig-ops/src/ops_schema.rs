//! Operation: print the option schema in effect.

use std::path::Path;

use rig_core::config::GlobalConfig;

/// Render the schema `rig resolve` would use, as TOML.
pub fn schema(explicit: Option<&Path>) -> miette::Result<String> {
    let config = GlobalConfig::load()?;
    let schema = crate::load_schema(explicit, &config)?;
    Ok(schema.to_toml_string()?)
}
