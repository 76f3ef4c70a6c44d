//! Handler for `rig tree`.

use std::path::PathBuf;

use miette::Result;

use rig_ops::ops_tree::{self, TreeOptions};

pub fn exec(descriptor: Option<PathBuf>, depth: Option<u32>, inverted: Option<String>) -> Result<()> {
    let path = rig_ops::locate_descriptor(descriptor.as_deref())?;
    let opts = TreeOptions {
        depth: depth.map(|d| d as usize),
        inverted,
    };
    print!("{}", ops_tree::tree(&path, &opts)?);
    Ok(())
}
