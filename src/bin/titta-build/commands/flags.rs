//! `titta-build flags` command

use anyhow::Result;

use crate::cli::FlagsArgs;
use titta_build::builder::configure;

pub fn execute(args: FlagsArgs) -> Result<()> {
    let config = super::load_config()?;
    let settings = super::settings(&args.target, &config)?;
    let configuration = configure(settings);
    let ext = &configuration.extension;

    // Either flag alone prints bare flags, one per line, for scripting
    if args.compile {
        for flag in &ext.extra_compile_args {
            println!("{}", flag);
        }
        return Ok(());
    }
    if args.link {
        for flag in &ext.extra_link_args {
            println!("{}", flag);
        }
        return Ok(());
    }

    println!(
        "# Compile flags for `{}` ({}, {}):",
        ext.descriptor.name, settings.platform, settings.family
    );
    for flag in &ext.extra_compile_args {
        println!("  {}", flag);
    }
    println!();
    println!("# Link flags for `{}`:", ext.descriptor.name);
    for flag in &ext.extra_link_args {
        println!("  {}", flag);
    }

    Ok(())
}
