//! Build configuration.
//!
//! Turns explicit settings (profile, platform, compiler family) into the
//! complete description of one extension build. This step is pure: it reads
//! no environment and no files, so equal settings always produce equal
//! configurations.

use serde::{Deserialize, Serialize};

use crate::core::{
    CompilerFamily, DataFileManifest, ExtensionDescriptor, FlagSet, FlagTable, PackageMetadata,
    Platform, Profile,
};
use crate::util::hash::Fingerprint;

/// Inputs of the configurator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildSettings {
    pub profile: Profile,
    pub platform: Platform,
    /// Compiler family of the toolchain that will run the build
    pub family: CompilerFamily,
}

impl BuildSettings {
    /// Settings for a platform using its default compiler family.
    pub fn new(profile: Profile, platform: Platform) -> Self {
        BuildSettings {
            profile,
            platform,
            family: platform.default_family(),
        }
    }

    /// Override the compiler family.
    pub fn with_family(mut self, family: CompilerFamily) -> Self {
        self.family = family;
        self
    }
}

/// Everything needed to build and install the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub settings: BuildSettings,
    pub metadata: PackageMetadata,
    /// The extension, with its extra compile/link arguments
    pub extension: ConfiguredExtension,
    /// The platform's full flag table, for inspection
    pub flag_table: FlagTable,
    pub data_files: DataFileManifest,
}

/// An extension together with the flags applied to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguredExtension {
    #[serde(flatten)]
    pub descriptor: ExtensionDescriptor,
    pub extra_compile_args: Vec<String>,
    pub extra_link_args: Vec<String>,
}

impl ConfiguredExtension {
    fn new(descriptor: ExtensionDescriptor, flags: FlagSet) -> Self {
        ConfiguredExtension {
            descriptor,
            extra_compile_args: flags.compile,
            extra_link_args: flags.link,
        }
    }
}

/// Configure a build.
pub fn configure(settings: BuildSettings) -> Configuration {
    let profile = settings.profile;
    let metadata = profile.metadata();
    let flag_table = profile.flag_table(settings.platform);
    let flags = compute_flags(&flag_table, settings.family, &metadata.version);
    let data_files = profile.data_files(settings.platform);

    tracing::debug!(
        "Configured {} {} for {} ({} compile flags, {} link flags, {} data file(s))",
        metadata.name,
        metadata.version,
        settings.platform,
        flags.compile.len(),
        flags.link.len(),
        data_files.file_count()
    );

    Configuration {
        settings,
        extension: ConfiguredExtension::new(profile.extension(), flags),
        metadata,
        flag_table,
        data_files,
    }
}

/// Final compile and link flags for a compiler family.
pub fn compute_flags(table: &FlagTable, family: CompilerFamily, version: &str) -> FlagSet {
    table.resolve(family, version)
}

impl Configuration {
    /// Compute the fingerprint of this configuration.
    ///
    /// Two configurations with the same fingerprint produce the same
    /// compiler invocations and install the same files.
    pub fn fingerprint(&self) -> String {
        let mut fp = Fingerprint::new();

        fp.update_str(self.settings.profile.as_str())
            .update_str(self.settings.platform.as_str())
            .update_str(self.settings.family.as_str())
            .update_str(&self.metadata.name)
            .update_str(&self.metadata.version)
            .update_str(&self.extension.descriptor.name)
            .update_str(self.extension.descriptor.language.as_str());

        for source in &self.extension.descriptor.sources {
            fp.update_str(&source.display().to_string());
        }
        for dir in &self.extension.descriptor.include_dirs {
            fp.update_str(&dir.to_string());
        }
        for dir in &self.extension.descriptor.library_dirs {
            fp.update_str(&dir.display().to_string());
        }

        fp.update_str("compile")
            .update_strs(self.extension.extra_compile_args.iter().map(String::as_str))
            .update_str("link")
            .update_strs(self.extension.extra_link_args.iter().map(String::as_str));

        for (dest, files) in self.data_files.iter() {
            fp.update_str(dest);
            for file in files {
                fp.update_str(&file.display().to_string());
            }
        }

        fp.finish_short()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn titta(platform: Platform, family: CompilerFamily) -> Configuration {
        configure(BuildSettings::new(Profile::Titta, platform).with_family(family))
    }

    #[test]
    fn test_unix_flags_on_linux() {
        let config = titta(Platform::Linux, CompilerFamily::Unix);

        assert_eq!(
            config.extension.extra_compile_args,
            vec![
                "-DBUILD_FROM_SCRIPT",
                "-DNDEBUG",
                "-std=c++2a",
                "-O3",
                "-fvisibility=hidden",
                "-ffunction-sections",
                "-fdata-sections",
                "-flto",
                "-DVERSION_INFO=\"1.0.0rc1\"",
            ]
        );
        assert_eq!(
            config.extension.extra_link_args,
            vec![
                "-flto",
                "-ltobii_research",
                "-L./TittaMex/64/Linux/",
                "-Wl,--gc-sections",
            ]
        );
    }

    #[test]
    fn test_unix_flags_on_macos() {
        let config = titta(Platform::MacOs, CompilerFamily::Unix);

        assert_eq!(
            config.extension.extra_compile_args,
            vec![
                "-DBUILD_FROM_SCRIPT",
                "-DNDEBUG",
                "-std=c++2a",
                "-O3",
                "-fvisibility=hidden",
                "-ffunction-sections",
                "-fdata-sections",
                "-flto",
                "-mmacosx-version-min=11",
                "-DVERSION_INFO=\"1.0.0rc1\"",
            ]
        );
        assert_eq!(
            config.extension.extra_link_args,
            vec![
                "-flto",
                "-ltobii_research",
                "-L./TittaMex/64/OSX/",
                "-Wl,-rpath,@loader_path",
                "-dead_strip",
            ]
        );
    }

    #[test]
    fn test_msvc_flags_on_windows() {
        let config = titta(Platform::Windows, CompilerFamily::Msvc);

        assert_eq!(
            config.extension.extra_compile_args,
            vec![
                "/DBUILD_FROM_SCRIPT",
                "/DNDEBUG",
                "/Zp8",
                "/GR",
                "/W3",
                "/EHs",
                "/nologo",
                "/MD",
                "/std:c++latest",
                "/Gy",
                "/Oi",
                "/GL",
                "/permissive-",
                "/O2",
                "/DVERSION_INFO=\"1.0.0rc1\"",
            ]
        );
        assert_eq!(
            config.extension.extra_link_args,
            vec!["/LTCG", "/OPT:REF", "/OPT:ICF"]
        );
    }

    #[test]
    fn test_version_define_follows_family() {
        for platform in Platform::ALL {
            let msvc = titta(platform, CompilerFamily::Msvc);
            let unix = titta(platform, CompilerFamily::Unix);
            let version = &msvc.metadata.version;

            assert_eq!(
                msvc.extension.extra_compile_args.last().unwrap(),
                &format!("/DVERSION_INFO=\"{}\"", version)
            );
            assert_eq!(
                unix.extension.extra_compile_args.last().unwrap(),
                &format!("-DVERSION_INFO=\"{}\"", version)
            );
        }
    }

    #[test]
    fn test_sources_identical_across_platforms() {
        let expected: Vec<PathBuf> = [
            "src/Titta.cpp",
            "src/types.cpp",
            "src/utils.cpp",
            "TittaPy/TittaPy.cpp",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();

        for platform in Platform::ALL {
            let config = configure(BuildSettings::new(Profile::Titta, platform));
            assert_eq!(config.extension.descriptor.sources, expected);
            assert_eq!(
                config.extension.descriptor.library_dirs,
                vec![PathBuf::from("deps/lib")]
            );
        }
    }

    #[test]
    fn test_data_files_by_platform() {
        assert_eq!(
            titta(Platform::Windows, CompilerFamily::Msvc).data_files.file_count(),
            1
        );
        assert_eq!(
            titta(Platform::MacOs, CompilerFamily::Unix).data_files.file_count(),
            1
        );
        assert!(titta(Platform::Linux, CompilerFamily::Unix).data_files.is_empty());
    }

    #[test]
    fn test_configure_is_deterministic() {
        for profile in Profile::ALL {
            for platform in Platform::ALL {
                let settings = BuildSettings::new(profile, platform);
                let first = configure(settings);
                let second = configure(settings);

                assert_eq!(first, second);
                assert_eq!(first.fingerprint(), second.fingerprint());
                assert_eq!(
                    serde_json::to_string(&first).unwrap(),
                    serde_json::to_string(&second).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_fingerprint_tracks_platform() {
        let linux = titta(Platform::Linux, CompilerFamily::Unix);
        let mac = titta(Platform::MacOs, CompilerFamily::Unix);
        assert_ne!(linux.fingerprint(), mac.fingerprint());
    }

    #[test]
    fn test_default_family() {
        assert_eq!(
            BuildSettings::new(Profile::Titta, Platform::Windows).family,
            CompilerFamily::Msvc
        );
        assert_eq!(
            BuildSettings::new(Profile::Titta, Platform::MacOs).family,
            CompilerFamily::Unix
        );
    }
}
