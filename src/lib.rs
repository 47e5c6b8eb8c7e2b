//! titta-build - build configurator for the TittaPy eye-tracker extension
//!
//! This crate decides how the native Python extension wrapping the Tobii
//! Pro SDK is compiled, linked and packaged on each platform, and can drive
//! the host compiler to build and install it.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

pub use builder::{configure, BuildSettings, Configuration};
pub use core::{CompilerFamily, ConfigureError, Platform, Profile};
pub use util::Config;
