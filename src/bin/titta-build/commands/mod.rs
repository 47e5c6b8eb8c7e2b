//! Command implementations

use anyhow::Result;

use crate::cli::TargetArgs;
use titta_build::builder::BuildSettings;
use titta_build::core::{CompilerFamily, Platform, Profile};
use titta_build::ops::resolve_profile;
use titta_build::util::config::load_project_config;
use titta_build::util::Config;

pub mod build;
pub mod configure;
pub mod data_files;
pub mod flags;
pub mod metadata;
pub mod toolchain;

/// Load the merged configuration for the current directory.
pub fn load_config() -> Result<Config> {
    let cwd = std::env::current_dir()?;
    Ok(load_project_config(&cwd))
}

/// Parse an optional profile name, falling back to the config.
pub fn profile(name: Option<&str>, config: &Config) -> Result<Profile> {
    let explicit = name.map(str::parse::<Profile>).transpose()?;
    resolve_profile(explicit, config)
}

/// Turn `--platform`, `--family` and `--profile` into configurator settings.
///
/// Without `--family`, the `family` under [toolchain] applies, then the
/// platform's usual compiler.
pub fn settings(args: &TargetArgs, config: &Config) -> Result<BuildSettings> {
    let platform = match args.platform {
        Some(ref identifier) => Platform::detect(identifier)?,
        None => Platform::host()?,
    };

    let family = args
        .family
        .as_deref()
        .or(config.toolchain.family.as_deref())
        .map(str::parse::<CompilerFamily>)
        .transpose()?;

    let profile = profile(args.profile.as_deref(), config)?;

    let settings = BuildSettings::new(profile, platform);
    Ok(match family {
        Some(family) => settings.with_family(family),
        None => settings,
    })
}
