//! Core data structures.
//!
//! This module contains the literal tables and the types describing one
//! build of the extension:
//! - Platform and compiler family identification
//! - The extension descriptor and the vendor data-file manifest
//! - Per-platform flag tables
//! - Package metadata and the built-in profiles

pub mod data_files;
pub mod error;
pub mod extension;
pub mod flags;
pub mod metadata;
pub mod platform;
pub mod profile;

pub use data_files::DataFileManifest;
pub use error::ConfigureError;
pub use extension::{ExtensionDescriptor, IncludeDir, Language};
pub use flags::{FlagSet, FlagTable};
pub use metadata::{PackageMetadata, Requirement};
pub use platform::{CompilerFamily, Platform};
pub use profile::Profile;
