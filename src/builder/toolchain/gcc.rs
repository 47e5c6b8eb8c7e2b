//! GCC/Clang toolchain implementation.

use std::path::{Path, PathBuf};

use crate::core::{CompilerFamily, Platform};

use super::{CommandSpec, CompileInput, LinkInput, Toolchain};

/// GCC/Clang toolchain (Unix-like drivers).
#[derive(Debug, Clone)]
pub struct GccToolchain {
    /// Path to the C++ compiler driver, also used for linking
    pub cxx: PathBuf,
    /// Platform the module is linked for
    pub platform: Platform,
}

impl GccToolchain {
    /// Create a new GCC-style toolchain.
    pub fn new(cxx: PathBuf, platform: Platform) -> Self {
        GccToolchain { cxx, platform }
    }

    /// Infer C++ compiler path from C compiler path.
    ///
    /// Handles common patterns:
    /// - gcc, x86_64-linux-gnu-gcc -> g++, x86_64-linux-gnu-g++
    /// - clang -> clang++
    /// - cc, /usr/bin/cc -> c++, /usr/bin/c++
    pub fn infer_cxx(cc: &Path) -> PathBuf {
        let cc_str = cc.to_string_lossy();

        // gcc or *-gcc -> g++ or *-g++
        if cc_str.ends_with("gcc") {
            return PathBuf::from(format!("{}++", &cc_str[..cc_str.len() - 2]));
        }

        // clang -> clang++
        if cc_str.ends_with("clang") {
            return PathBuf::from(format!("{}++", cc_str));
        }

        // Only match "cc" when it's a complete basename (not "mycc")
        let is_standalone_cc = cc_str == "cc"
            || cc_str.ends_with("/cc")
            || cc_str.ends_with("\\cc")
            || cc_str.ends_with("-cc");

        if is_standalone_cc {
            return PathBuf::from(format!("{}++", &cc_str[..cc_str.len() - 1]));
        }

        PathBuf::from(format!("{}++", cc_str))
    }
}

impl Toolchain for GccToolchain {
    fn family(&self) -> CompilerFamily {
        CompilerFamily::Unix
    }

    fn compiler_path(&self) -> &Path {
        &self.cxx
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cxx);

        // Compile only, position independent for a loadable module
        cmd = cmd.arg("-c").arg("-fPIC");

        // Include directories
        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        // Custom flags
        cmd = cmd.args(input.cflags.iter().cloned());

        // Input and output
        cmd = cmd.arg(input.source.display().to_string());
        cmd = cmd.arg("-o");
        cmd = cmd.arg(input.output.display().to_string());

        cmd
    }

    fn link_extension_command(&self, input: &LinkInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cxx);

        // Symbols from the interpreter resolve at load time on macOS
        cmd = match self.platform {
            Platform::MacOs => cmd.args(["-bundle", "-undefined", "dynamic_lookup"]),
            Platform::Linux | Platform::Windows => cmd.arg("-shared"),
        };

        // Object files
        for obj in &input.objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        // Library search paths
        for dir in &input.lib_dirs {
            cmd = cmd.arg(format!("-L{}", dir.display()));
        }

        // Custom flags (these carry the vendor -l/-L entries)
        cmd = cmd.args(input.ldflags.iter().cloned());

        // Output
        cmd = cmd.arg("-o");
        cmd = cmd.arg(input.output.display().to_string());

        cmd
    }

    fn object_extension(&self) -> &str {
        "o"
    }
}
