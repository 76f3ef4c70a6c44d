//! Check command implementation.

use std::path::PathBuf;

use miette::Result;
use rig_core::config::GlobalConfig;

pub fn exec(descriptor: Option<PathBuf>, schema: Option<PathBuf>) -> Result<()> {
    let path = rig_ops::locate_descriptor(descriptor.as_deref())?;
    let config = GlobalConfig::load()?;
    let schema = rig_ops::load_schema(schema.as_deref(), &config)?;
    rig_ops::ops_check::check(&path, &schema)?;
    Ok(())
}
