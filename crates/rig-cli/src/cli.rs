//! CLI argument definitions for rig.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use rig_core::plan::PlanFormat;

#[derive(Parser, Debug)]
#[command(
    name = "rig",
    version,
    about = "Resolve build descriptors into ordered, validated build plans",
    long_about = "rig reads a declarative build descriptor (plugins, SDK options, \
                  dependencies, build variants), validates it against an option schema, \
                  and emits a deterministic plan for an external build executor."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a descriptor into a build plan
    Resolve {
        /// Descriptor file or directory (defaults to the nearest build.rig)
        descriptor: Option<PathBuf>,
        /// Resolve only this variant
        #[arg(long)]
        variant: Option<String>,
        /// Option schema file (TOML)
        #[arg(long)]
        schema: Option<PathBuf>,
        /// Plan output format
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        /// Write the plan to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a descriptor without emitting a plan
    Check {
        /// Descriptor file or directory (defaults to the nearest build.rig)
        descriptor: Option<PathBuf>,
        /// Option schema file (TOML)
        #[arg(long)]
        schema: Option<PathBuf>,
    },

    /// Display the dependency tree
    Tree {
        /// Descriptor file or directory (defaults to the nearest build.rig)
        descriptor: Option<PathBuf>,
        /// Maximum depth to display
        #[arg(long)]
        depth: Option<u32>,
        /// Show what requires the given dependency
        #[arg(long, value_name = "ID")]
        inverted: Option<String>,
    },

    /// List variants with their inheritance lineage
    Variants {
        /// Descriptor file or directory (defaults to the nearest build.rig)
        descriptor: Option<PathBuf>,
        /// Option schema file (TOML)
        #[arg(long)]
        schema: Option<PathBuf>,
    },

    /// Print the option schema in effect
    Schema {
        /// Option schema file (TOML) instead of the configured one
        #[arg(long)]
        schema: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FormatArg {
    Json,
    Toml,
}

impl From<FormatArg> for PlanFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => PlanFormat::Json,
            FormatArg::Toml => PlanFormat::Toml,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
