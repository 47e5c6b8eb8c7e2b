//! Extension build system.
//!
//! `configure` is the pure configurator; the rest turns a configuration into
//! compiler invocations for the host and runs them.

pub mod configure;
pub mod native;
pub mod plan;
pub mod python;
pub mod toolchain;

pub use configure::{configure, BuildSettings, Configuration, ConfiguredExtension};
pub use native::{BuildOutput, InstalledFile, NativeBuilder};
pub use plan::{BuildLayout, BuildPlan, BuildStep};
pub use python::PythonEnv;
pub use toolchain::{detect_toolchain, CommandSpec, GccToolchain, MsvcToolchain, Toolchain};
