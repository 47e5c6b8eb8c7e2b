//! High-level operations.
//!
//! This module contains the implementation of titta-build commands that
//! touch the host (compilers, interpreters, the filesystem).

pub mod build;

pub use build::{build, resolve_profile, BuildOptions, BuildResult};
