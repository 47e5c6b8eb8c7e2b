//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// titta-build - build configurator for the TittaPy eye-tracker extension
#[derive(Parser)]
#[command(name = "titta-build")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the complete build configuration
    Configure(ConfigureArgs),

    /// Show the extra compile/link flags of the extension
    Flags(FlagsArgs),

    /// Show the vendor libraries installed with the package
    DataFiles(DataFilesArgs),

    /// Show the package metadata
    Metadata(MetadataArgs),

    /// Compile, link and optionally install the extension for this host
    Build(BuildArgs),

    /// Show the detected compiler and Python interpreter
    Toolchain(ToolchainArgs),
}

/// Which build to configure.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Platform identifier (`win32`, `linux`, `darwin`, ...); defaults to the host
    #[arg(long, env = "TITTA_PLATFORM")]
    pub platform: Option<String>,

    /// Compiler family (`msvc` or `unix`); defaults to the platform's usual compiler
    #[arg(long)]
    pub family: Option<String>,

    /// Package profile (`titta`, `titta-mex`, `tobii-wrapper`)
    #[arg(long)]
    pub profile: Option<String>,
}

#[derive(Args)]
pub struct ConfigureArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Print the configuration as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct FlagsArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Show compile flags only
    #[arg(long, conflicts_with = "link")]
    pub compile: bool,

    /// Show link flags only
    #[arg(long)]
    pub link: bool,
}

#[derive(Args)]
pub struct DataFilesArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args)]
pub struct MetadataArgs {
    /// Package profile (`titta`, `titta-mex`, `tobii-wrapper`)
    #[arg(long)]
    pub profile: Option<String>,

    /// Print core metadata (PKG-INFO) instead of a summary
    #[arg(long)]
    pub pkg_info: bool,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Package profile (`titta`, `titta-mex`, `tobii-wrapper`)
    #[arg(long)]
    pub profile: Option<String>,

    /// Output directory for objects and the module
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Install prefix (a virtualenv or Python prefix)
    #[arg(long)]
    pub install_root: Option<PathBuf>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Emit compile_commands.json
    #[arg(long)]
    pub emit_compile_commands: bool,

    /// Emit build plan as JSON (no build)
    #[arg(long)]
    pub plan: bool,

    /// Python interpreter to build for
    #[arg(long, env = "PYTHON")]
    pub python: Option<PathBuf>,
}

#[derive(Args)]
pub struct ToolchainArgs {
    /// Python interpreter to inspect
    #[arg(long, env = "PYTHON")]
    pub python: Option<PathBuf>,
}
