//! `titta-build build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use titta_build::core::Profile;
use titta_build::ops::{build, BuildOptions};

pub fn execute(args: BuildArgs, verbose: bool) -> Result<()> {
    let config = super::load_config()?;
    let profile = args
        .profile
        .as_deref()
        .map(str::parse::<Profile>)
        .transpose()?;

    let opts = BuildOptions {
        project_root: std::env::current_dir()?,
        profile,
        out_dir: args.out_dir,
        install_root: args.install_root,
        jobs: args.jobs,
        emit_compile_commands: args.emit_compile_commands,
        plan_only: args.plan,
        verbose,
        interpreter: args.python,
    };

    let result = build(&opts, &config)?;

    if args.plan {
        println!("{}", result.plan.to_json()?);
        return Ok(());
    }

    if let Some(output) = result.output {
        eprintln!("    Finished `{}` -> {}", result.plan.module, output.module.display());
        for file in &output.installed {
            tracing::debug!("installed {} (sha256 {})", file.path.display(), file.sha256);
        }
        if !output.installed.is_empty() {
            eprintln!("   Installed {} file(s)", output.installed.len());
        }
    }

    Ok(())
}
