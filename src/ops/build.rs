//! Implementation of `titta-build build`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::configure::{configure, BuildSettings};
use crate::builder::native::{BuildOutput, NativeBuilder};
use crate::builder::plan::{BuildLayout, BuildPlan};
use crate::builder::python::{find_interpreter, PythonEnv};
use crate::builder::toolchain::detect_toolchain;
use crate::core::{Platform, Profile};
use crate::util::config::Config;

/// Default output directory, relative to the project root.
pub const DEFAULT_OUT_DIR: &str = "build";

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Project root holding the sources and vendor libraries
    pub project_root: PathBuf,

    /// Package profile (falls back to the config, then `titta`)
    pub profile: Option<Profile>,

    /// Output directory for objects and the module
    pub out_dir: Option<PathBuf>,

    /// Install prefix; the build stops after linking when unset
    pub install_root: Option<PathBuf>,

    /// Number of parallel jobs
    pub jobs: Option<usize>,

    /// Emit compile_commands.json
    pub emit_compile_commands: bool,

    /// Plan only, without running anything
    pub plan_only: bool,

    /// Verbose output
    pub verbose: bool,

    /// Interpreter to build for
    pub interpreter: Option<PathBuf>,
}

/// Result of a build.
#[derive(Debug)]
pub struct BuildResult {
    /// The plan that was (or would be) executed
    pub plan: BuildPlan,

    /// Build output, unless only planning
    pub output: Option<BuildOutput>,

    /// Where compile_commands.json was written
    pub compile_commands: Option<PathBuf>,
}

/// Pick the profile from the command line, then the config, then the default.
pub fn resolve_profile(explicit: Option<Profile>, config: &Config) -> Result<Profile> {
    if let Some(profile) = explicit {
        return Ok(profile);
    }
    match config.build.profile {
        Some(ref name) => Ok(name
            .parse::<Profile>()
            .context("invalid `profile` under [build] in config")?),
        None => Ok(Profile::default()),
    }
}

/// Build the extension for the host.
pub fn build(opts: &BuildOptions, config: &Config) -> Result<BuildResult> {
    let profile = resolve_profile(opts.profile, config)?;
    let platform = Platform::host()?;

    let toolchain = detect_toolchain(&config.toolchain, platform)?;
    let settings = BuildSettings::new(profile, platform).with_family(toolchain.family());
    let configuration = configure(settings);

    tracing::info!(
        "Building {} {} ({}, {}) with {}",
        configuration.metadata.name,
        configuration.metadata.version,
        profile,
        platform,
        toolchain.compiler_path().display()
    );

    let interpreter = find_interpreter(
        opts.interpreter
            .as_deref()
            .or(config.python.interpreter.as_deref()),
    )?;
    let python = PythonEnv::inspect(&interpreter)?;
    python.check_requirements(&configuration.metadata)?;

    let layout = build_layout(opts, config);
    let plan = BuildPlan::new(
        &configuration,
        toolchain.as_ref(),
        &python,
        layout,
        &config.toolchain,
    )?;

    let compile_commands = if opts.emit_compile_commands || config.build.emit_compile_commands {
        let path = plan.layout.out_dir.join("compile_commands.json");
        plan.emit_compile_commands(&path)?;
        Some(path)
    } else {
        None
    };

    if opts.plan_only {
        return Ok(BuildResult {
            plan,
            output: None,
            compile_commands,
        });
    }

    let output = NativeBuilder::new()
        .jobs(opts.jobs.or(config.build.jobs))
        .verbose(opts.verbose)
        .execute(&plan)?;

    Ok(BuildResult {
        plan,
        output: Some(output),
        compile_commands,
    })
}

/// Directories for a build, command line taking precedence over config.
fn build_layout(opts: &BuildOptions, config: &Config) -> BuildLayout {
    let out_dir = opts
        .out_dir
        .as_deref()
        .or(config.build.out_dir.as_deref())
        .unwrap_or(Path::new(DEFAULT_OUT_DIR));
    let install_root = opts
        .install_root
        .as_deref()
        .or(config.build.install_root.as_deref());

    BuildLayout::new(&opts.project_root, out_dir, install_root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_profile_precedence() {
        let mut config = Config::default();
        assert_eq!(resolve_profile(None, &config).unwrap(), Profile::Titta);

        config.build.profile = Some("tobii-wrapper".to_string());
        assert_eq!(resolve_profile(None, &config).unwrap(), Profile::TobiiWrapper);
        assert_eq!(
            resolve_profile(Some(Profile::TittaMex), &config).unwrap(),
            Profile::TittaMex
        );

        config.build.profile = Some("tobiimex".to_string());
        let err = resolve_profile(None, &config).unwrap_err();
        assert!(format!("{:#}", err).contains("tobiimex"));
    }

    #[test]
    #[cfg(unix)]
    fn test_build_layout_precedence() {
        let mut config = Config::default();
        config.build.out_dir = Some(PathBuf::from("cfg-out"));
        config.build.install_root = Some(PathBuf::from("/opt/venv"));

        let opts = BuildOptions {
            project_root: PathBuf::from("/project"),
            ..Default::default()
        };
        let layout = build_layout(&opts, &config);
        assert_eq!(layout.out_dir, PathBuf::from("/project/cfg-out"));
        assert_eq!(layout.install_root, Some(PathBuf::from("/opt/venv")));

        let opts = BuildOptions {
            project_root: PathBuf::from("/project"),
            out_dir: Some(PathBuf::from("out")),
            ..Default::default()
        };
        assert_eq!(
            build_layout(&opts, &config).out_dir,
            PathBuf::from("/project/out")
        );

        let layout = build_layout(&opts, &Config::default());
        assert_eq!(layout.install_root, None);
    }
}
