//! Handler for `rig schema`.

use std::path::PathBuf;

use miette::Result;

pub fn exec(schema: Option<PathBuf>) -> Result<()> {
    print!("{}", rig_ops::ops_schema::schema(schema.as_deref())?);
    Ok(())
}
