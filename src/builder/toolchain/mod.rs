//! Toolchain abstraction for the extension compiler.
//!
//! This module provides a unified interface for generating compiler/linker
//! commands for the two supported compiler families (Unix-like drivers and
//! MSVC).
//!
//! Toolchain detection priority:
//! 1. Config file (`.titta/config.toml` or `~/.titta/config.toml`)
//! 2. Environment variables (CXX, CC)
//! 3. Auto-detection (searching PATH for common compilers)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::CompilerFamily;

mod detect;
mod gcc;
mod msvc;

pub use detect::{detect_toolchain, family_from_compiler};
pub use gcc::GccToolchain;
pub use msvc::MsvcToolchain;

/// A command to execute, with program, arguments, and environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// The program to run (e.g., "c++", "cl.exe")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
    /// Environment variables to set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Program followed by its arguments, as in `compile_commands.json`.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.program.display().to_string());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

/// Input for a compile step.
#[derive(Debug, Clone)]
pub struct CompileInput {
    /// Source file to compile
    pub source: PathBuf,
    /// Output object file
    pub output: PathBuf,
    /// Include directories, in search order
    pub include_dirs: Vec<PathBuf>,
    /// Extra compiler flags, passed through verbatim
    pub cflags: Vec<String>,
}

/// Input for linking the extension module.
#[derive(Debug, Clone)]
pub struct LinkInput {
    /// Object files to link
    pub objects: Vec<PathBuf>,
    /// Output module
    pub output: PathBuf,
    /// Library search paths
    pub lib_dirs: Vec<PathBuf>,
    /// Extra linker flags, passed through verbatim
    pub ldflags: Vec<String>,
    /// Module initialisation symbol that must be exported
    pub export_symbol: String,
    /// Directory for linker by-products (import libraries)
    pub temp_dir: PathBuf,
}

/// Trait for toolchain implementations.
///
/// Each toolchain knows how to generate commands for its specific compiler.
pub trait Toolchain: Send + Sync {
    /// Get the compiler family.
    fn family(&self) -> CompilerFamily;

    /// Get the C++ compiler path.
    fn compiler_path(&self) -> &Path;

    /// Generate a C++ compile command.
    fn compile_command(&self, input: &CompileInput) -> CommandSpec;

    /// Generate the command linking objects into a loadable extension module.
    fn link_extension_command(&self, input: &LinkInput) -> CommandSpec;

    /// Get the object file extension.
    fn object_extension(&self) -> &str;
}
