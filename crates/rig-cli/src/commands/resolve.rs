//! Handler for `rig resolve`.

use std::path::PathBuf;

use miette::Result;

use rig_ops::ops_resolve::{self, ResolveOptions};

use crate::cli::FormatArg;

pub fn exec(
    descriptor: Option<PathBuf>,
    variant: Option<String>,
    schema: Option<PathBuf>,
    format: Option<FormatArg>,
    output: Option<PathBuf>,
) -> Result<()> {
    let path = rig_ops::locate_descriptor(descriptor.as_deref())?;
    let opts = ResolveOptions {
        variant,
        schema,
        format: format.map(Into::into),
        output,
    };
    ops_resolve::resolve(&path, &opts)
}
