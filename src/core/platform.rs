//! Host platform and compiler family identification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigureError;

/// Operating system the extension is built for.
///
/// Derived once per invocation and passed by value to everything that
/// depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    #[serde(rename = "macos")]
    MacOs,
}

/// Identifier prefixes recognised for each platform.
///
/// Covers both interpreter-style identifiers (`win32`, `linux`, `darwin`)
/// and Rust's `std::env::consts::OS` values (`windows`, `linux`, `macos`).
const PLATFORM_PREFIXES: &[(&str, Platform)] = &[
    ("win", Platform::Windows),
    ("linux", Platform::Linux),
    ("darwin", Platform::MacOs),
    ("macos", Platform::MacOs),
];

impl Platform {
    /// All supported platforms.
    pub const ALL: [Platform; 3] = [Platform::Windows, Platform::Linux, Platform::MacOs];

    /// Detect the platform from an operating-system identifier.
    ///
    /// Matching is by prefix and case-insensitive. Identifiers that match no
    /// known prefix are rejected rather than left undetermined.
    pub fn detect(identifier: &str) -> Result<Self, ConfigureError> {
        let lowered = identifier.trim().to_ascii_lowercase();

        PLATFORM_PREFIXES
            .iter()
            .find(|(prefix, _)| lowered.starts_with(prefix))
            .map(|(_, platform)| *platform)
            .ok_or_else(|| ConfigureError::UnsupportedPlatform {
                identifier: identifier.to_string(),
            })
    }

    /// Detect the platform of the running host.
    pub fn host() -> Result<Self, ConfigureError> {
        Platform::detect(std::env::consts::OS)
    }

    /// Get the platform name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
        }
    }

    /// The compiler family a host toolchain uses by default.
    pub fn default_family(&self) -> CompilerFamily {
        match self {
            Platform::Windows => CompilerFamily::Msvc,
            Platform::Linux | Platform::MacOs => CompilerFamily::Unix,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ConfigureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::detect(s)
    }
}

/// Compiler family, which decides the flag syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerFamily {
    /// Microsoft Visual C++ (`cl.exe`)
    Msvc,
    /// GCC, Clang and Apple Clang drivers
    Unix,
}

impl CompilerFamily {
    /// Get the family identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerFamily::Msvc => "msvc",
            CompilerFamily::Unix => "unix",
        }
    }

    /// Prefix used for preprocessor definitions (`/D` or `-D`).
    pub fn define_prefix(&self) -> &'static str {
        match self {
            CompilerFamily::Msvc => "/D",
            CompilerFamily::Unix => "-D",
        }
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompilerFamily {
    type Err = ConfigureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "msvc" => Ok(CompilerFamily::Msvc),
            "unix" => Ok(CompilerFamily::Unix),
            _ => Err(ConfigureError::UnknownCompilerFamily {
                family: s.to_string(),
            }),
        }
    }
}
