//! `titta-build configure` command

use anyhow::Result;
use serde::Serialize;

use crate::cli::ConfigureArgs;
use titta_build::builder::{configure, Configuration};

#[derive(Serialize)]
struct ConfigureOutput<'a> {
    fingerprint: String,
    #[serde(flatten)]
    configuration: &'a Configuration,
}

pub fn execute(args: ConfigureArgs) -> Result<()> {
    let config = super::load_config()?;
    let settings = super::settings(&args.target, &config)?;
    let configuration = configure(settings);

    if args.json {
        let output = ConfigureOutput {
            fingerprint: configuration.fingerprint(),
            configuration: &configuration,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let metadata = &configuration.metadata;
    let ext = &configuration.extension;

    println!(
        "{} {} (profile: {}, platform: {}, compiler: {})",
        metadata.name, metadata.version, settings.profile, settings.platform, settings.family
    );
    println!("Fingerprint: {}", configuration.fingerprint());
    println!();

    println!(
        "Extension `{}` ({})",
        ext.descriptor.name,
        ext.descriptor.language.as_str()
    );
    println!("  Sources:");
    for source in &ext.descriptor.sources {
        println!("    {}", source.display());
    }
    println!("  Include directories:");
    for dir in &ext.descriptor.include_dirs {
        println!("    {}", dir);
    }
    println!("  Library directories:");
    for dir in &ext.descriptor.library_dirs {
        println!("    {}", dir.display());
    }
    println!("  Extra compile args:");
    for flag in &ext.extra_compile_args {
        println!("    {}", flag);
    }
    println!("  Extra link args:");
    for flag in &ext.extra_link_args {
        println!("    {}", flag);
    }
    println!();

    if configuration.data_files.is_empty() {
        println!("Data files: (none)");
    } else {
        println!("Data files:");
        for (dest, files) in configuration.data_files.iter() {
            for file in files {
                println!("  {} -> {}", file.display(), dest);
            }
        }
    }

    Ok(())
}
