//! Handler for `rig variants`.

use std::path::PathBuf;

use miette::Result;
use rig_core::config::GlobalConfig;
use rig_ops::ops_variants;

pub fn exec(descriptor: Option<PathBuf>, schema: Option<PathBuf>) -> Result<()> {
    let path = rig_ops::locate_descriptor(descriptor.as_deref())?;
    let config = GlobalConfig::load()?;
    let schema = rig_ops::load_schema(schema.as_deref(), &config)?;
    let variants = ops_variants::variants(&path, &schema)?;
    print!("{}", ops_variants::format_variants(&variants));
    Ok(())
}
