//! Shared utilities for the rig resolver.
//!
//! This crate provides cross-cutting concerns used by all other rig crates:
//! error types, filesystem helpers, content hashing, and Cargo-style
//! status output.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod progress;
