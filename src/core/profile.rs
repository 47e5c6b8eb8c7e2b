//! Built-in package profiles.
//!
//! Each profile is one distributable wrapper around the Tobii Pro SDK. A
//! profile owns literal tables only: metadata, the extension descriptor, the
//! per-platform flag tables and the per-platform data files. Everything is
//! constructed fresh on each call and never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::data_files::DataFileManifest;
use crate::core::error::ConfigureError;
use crate::core::extension::ExtensionDescriptor;
use crate::core::flags::{DefineQuoting, FamilyFlags, FlagTable};
use crate::core::metadata::{PackageMetadata, PythonPackage, Requirement};
use crate::core::platform::Platform;

const AUTHOR: &str = "Diederick C. Niehorster";
const AUTHOR_EMAIL: &str = "diederick_c.niehorster@humlab.lu.se";
const URL: &str = "https://github.com/dcnieho/Titta";
const KEYWORDS: &str = "Tobii PsychoPy";

/// Compile flags shared by the optimised MSVC builds.
const MSVC_RELEASE_COMPILE: &[&str] = &[
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
];

const MSVC_RELEASE_LINK: &[&str] = &["/LTCG", "/OPT:REF", "/OPT:ICF"];

/// A distributable package built by this tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    /// `TittaPy`, the Python interface to Titta
    #[default]
    Titta,
    /// `TittaPy` as built from the MATLAB-oriented TittaMex tree
    TittaMex,
    /// `TobiiWrapper`, the older wrapper with a pure-Python shim package
    TobiiWrapper,
}

impl Profile {
    /// All known profiles.
    pub const ALL: [Profile; 3] = [Profile::Titta, Profile::TittaMex, Profile::TobiiWrapper];

    /// Get the profile name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Titta => "titta",
            Profile::TittaMex => "titta-mex",
            Profile::TobiiWrapper => "tobii-wrapper",
        }
    }

    /// Package metadata.
    pub fn metadata(&self) -> PackageMetadata {
        let pybind11 = |minor, patch| Requirement::at_least("pybind11", 2, minor, patch);

        match self {
            Profile::Titta => PackageMetadata {
                name: "TittaPy".to_string(),
                version: "1.0.0rc1".to_string(),
                author: AUTHOR.to_string(),
                author_email: AUTHOR_EMAIL.to_string(),
                url: URL.to_string(),
                description: "Interface to Tobii eye trackers using Tobii Pro SDK".to_string(),
                keywords: KEYWORDS.to_string(),
                python_requires: Some(Requirement::at_least("python", 3, 8, None)),
                setup_requires: vec![pybind11(10, Some(1))],
                install_requires: Vec::new(),
                packages: Vec::new(),
                zip_safe: None,
            },
            Profile::TittaMex => PackageMetadata {
                name: "TittaPy".to_string(),
                version: "1.0.0-rc1".to_string(),
                author: AUTHOR.to_string(),
                author_email: AUTHOR_EMAIL.to_string(),
                url: URL.to_string(),
                description:
                    "Matlab and PsychToolbox interface to Tobii eye trackers using Tobii Pro SDK"
                        .to_string(),
                keywords: KEYWORDS.to_string(),
                python_requires: None,
                setup_requires: vec![pybind11(10, Some(1))],
                install_requires: vec![pybind11(10, Some(1))],
                packages: Vec::new(),
                zip_safe: None,
            },
            Profile::TobiiWrapper => PackageMetadata {
                name: "TobiiWrapper_python".to_string(),
                version: "1.0.0-rc1".to_string(),
                author: AUTHOR.to_string(),
                author_email: AUTHOR_EMAIL.to_string(),
                url: URL.to_string(),
                description:
                    "Matlab and PsychToolbox interface to Tobii eye trackers using Tobii Pro SDK"
                        .to_string(),
                keywords: KEYWORDS.to_string(),
                python_requires: None,
                setup_requires: vec![pybind11(4, None)],
                install_requires: vec![pybind11(4, None)],
                packages: vec![PythonPackage {
                    name: "TobiiWrapper".to_string(),
                    root: "TobiiWrapper_python".into(),
                }],
                zip_safe: Some(false),
            },
        }
    }

    /// The extension descriptor. Identical on every platform.
    pub fn extension(&self) -> ExtensionDescriptor {
        match self {
            Profile::Titta | Profile::TittaMex => ExtensionDescriptor::pybind11(
                "TittaPy",
                &[
                    "src/Titta.cpp",
                    "src/types.cpp",
                    "src/utils.cpp",
                    "TittaPy/TittaPy.cpp",
                ],
                &[".", "deps/include"],
                &["deps/lib"],
            ),
            Profile::TobiiWrapper => ExtensionDescriptor::pybind11(
                "TobiiWrapper",
                &[
                    "src/TobiiMex.cpp",
                    "src/types.cpp",
                    "src/utils.cpp",
                    "TobiiWrapper_python/TobiiWrapper_python.cpp",
                ],
                &[".", "deps/include"],
                &["deps/lib"],
            ),
        }
    }

    /// The complete flag table for a platform.
    pub fn flag_table(&self, platform: Platform) -> FlagTable {
        match self {
            Profile::Titta => FlagTable {
                msvc: FamilyFlags::new(MSVC_RELEASE_COMPILE, MSVC_RELEASE_LINK),
                unix: titta_unix_flags(platform),
            },
            Profile::TittaMex => FlagTable {
                msvc: FamilyFlags::new(MSVC_RELEASE_COMPILE, MSVC_RELEASE_LINK)
                    .with_quoting(DefineQuoting::Escaped),
                unix: FamilyFlags::new(
                    &[
                        "-DBUILD_FROM_SCRIPT",
                        "-DNDEBUG",
                        "-std=c++17",
                        "-O3",
                        "-fvisibility=hidden",
                    ],
                    &["-Wl,-rpath,$ORIGIN"],
                ),
            },
            Profile::TobiiWrapper => FlagTable {
                msvc: FamilyFlags::new(
                    &["/DBUILD_FROM_SCRIPT", "/DNDEBUG", "/EHsc", "/std:c++latest"],
                    &[],
                )
                .with_quoting(DefineQuoting::Escaped),
                unix: FamilyFlags::new(&["-DBUILD_FROM_SCRIPT", "-DNDEBUG", "-std=c++17"], &[])
                    .with_after_define(&["-fvisibility=hidden"]),
            },
        }
    }

    /// Vendor libraries to install for a platform.
    pub fn data_files(&self, platform: Platform) -> DataFileManifest {
        match (self, platform) {
            (Profile::Titta, Platform::Windows) => DataFileManifest::single(
                "lib\\site-packages",
                "./TittaMex/64/Windows/tobii_research.dll",
            ),
            (Profile::Titta, Platform::MacOs) => DataFileManifest::single(
                "lib/site-packages/",
                "./TittaMex/64/OSX/libtobii_research.1.10.1.dylib",
            ),
            (Profile::TittaMex, _) => DataFileManifest::single(
                "lib\\site-packages\\",
                "./TittaMex_matlab/64/Windows/tobii_research.dll",
            ),
            _ => DataFileManifest::new(),
        }
    }
}

/// Unix flags of the `titta` profile. The whole table is spelled out per
/// platform branch so that each platform's table reads in one place.
fn titta_unix_flags(platform: Platform) -> FamilyFlags {
    match platform {
        Platform::MacOs => FamilyFlags::new(
            &[
                "-DBUILD_FROM_SCRIPT",
                "-DNDEBUG",
                "-std=c++2a",
                "-O3",
                "-fvisibility=hidden",
                "-ffunction-sections",
                "-fdata-sections",
                "-flto",
                "-mmacosx-version-min=11",
            ],
            &[
                "-flto",
                "-ltobii_research",
                "-L./TittaMex/64/OSX/",
                "-Wl,-rpath,@loader_path",
                "-dead_strip",
            ],
        ),
        Platform::Linux | Platform::Windows => FamilyFlags::new(
            &[
                "-DBUILD_FROM_SCRIPT",
                "-DNDEBUG",
                "-std=c++2a",
                "-O3",
                "-fvisibility=hidden",
                "-ffunction-sections",
                "-fdata-sections",
                "-flto",
            ],
            &[
                "-flto",
                "-ltobii_research",
                "-L./TittaMex/64/Linux/",
                "-Wl,--gc-sections",
            ],
        ),
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = ConfigureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Profile::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigureError::UnknownProfile {
                name: s.to_string(),
                available: Profile::ALL
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
