pub mod ops_check;
pub mod ops_resolve;
pub mod ops_schema;
pub mod ops_tree;
pub mod ops_variants;

use std::path::{Path, PathBuf};

use rig_core::config::GlobalConfig;
use rig_core::descriptor::Descriptor;
use rig_core::schema::OptionSchema;
use rig_core::DESCRIPTOR_FILE_NAME;
use rig_util::errors::RigError;

/// Find the descriptor to operate on.
///
/// A directory means `<dir>/build.rig`; no path means the nearest `build.rig`
/// in the working directory or one of its parents.
pub fn locate_descriptor(path: Option<&Path>) -> miette::Result<PathBuf> {
    match path {
        Some(p) if p.is_dir() => Ok(p.join(DESCRIPTOR_FILE_NAME)),
        Some(p) => Ok(p.to_path_buf()),
        None => {
            let cwd = std::env::current_dir().map_err(RigError::Io)?;
            rig_util::fs::find_file_upwards(&cwd, DESCRIPTOR_FILE_NAME).ok_or_else(|| {
                RigError::Generic {
                    message: format!(
                        "could not find {DESCRIPTOR_FILE_NAME} in {} or any parent directory",
                        cwd.display()
                    ),
                }
                .into()
            })
        }
    }
}

/// Pick the option schema: `--schema`, then `[resolve] schema` from the
/// global config, then the built-in Android schema.
pub fn load_schema(explicit: Option<&Path>, config: &GlobalConfig) -> miette::Result<OptionSchema> {
    let chosen = explicit.or(config.resolve.schema.as_deref());
    match chosen {
        Some(path) => {
            rig_util::progress::status_info("Schema", &path.display().to_string());
            Ok(OptionSchema::from_path(path)?)
        }
        None => {
            tracing::debug!("using the built-in android schema");
            Ok(OptionSchema::android())
        }
    }
}

/// Parse and validate a descriptor against `schema`.
pub fn load_validated(path: &Path, schema: &OptionSchema) -> miette::Result<Descriptor> {
    let descriptor = Descriptor::from_path(path)?;
    Ok(rig_core::validate::validate(&descriptor, schema)?)
}

/// File name shown in status lines and recorded in the plan.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
