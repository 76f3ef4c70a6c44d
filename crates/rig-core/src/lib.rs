//! Core data types for the rig resolver.
//!
//! This crate defines what a build descriptor is and how it is checked:
//! the descriptor text format and its parser, typed option values, the
//! option schema and validator, version constraints, `.rig.env`
//! interpolation, the global configuration, and the serialized plan handed
//! to an external build executor.
//!
//! Everything here is synchronous and free of network I/O.

/// Conventional descriptor file name looked up from the working directory.
pub const DESCRIPTOR_FILE_NAME: &str = "build.rig";

pub mod config;
pub mod descriptor;
pub mod parser;
pub mod plan;
pub mod properties;
pub mod schema;
pub mod validate;
pub mod value;
pub mod version;
