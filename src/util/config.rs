//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.titta/config.toml` - User-wide defaults (`$TITTA_HOME/config.toml`
//!   when `TITTA_HOME` is set)
//! - Project: `.titta/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the directory holding configuration files.
pub const CONFIG_DIR: &str = ".titta";

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "config.toml";

/// Tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Compiler overrides
    pub toolchain: ToolchainSettings,

    /// Build settings
    pub build: BuildConfig,

    /// Interpreter settings
    pub python: PythonConfig,
}

/// Toolchain settings for C++ compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Path to the C compiler; the C++ driver is inferred from it when `cxx` is unset
    pub cc: Option<PathBuf>,

    /// Path to the C++ compiler (e.g., /usr/bin/clang++ or cl.exe)
    pub cxx: Option<PathBuf>,

    /// Path to the MSVC linker (link.exe)
    pub link: Option<PathBuf>,

    /// Compiler family (`msvc` or `unix`); inferred from the compiler name when unset
    pub family: Option<String>,

    /// Additional compiler flags, appended after the package flags
    #[serde(default)]
    pub cflags: Vec<String>,

    /// Additional linker flags, appended after the package flags
    #[serde(default)]
    pub ldflags: Vec<String>,
}

impl ToolchainSettings {
    /// Check if any compiler is configured.
    pub fn has_compiler(&self) -> bool {
        self.cc.is_some() || self.cxx.is_some()
    }
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default package profile
    pub profile: Option<String>,

    /// Directory receiving objects and the compiled module
    pub out_dir: Option<PathBuf>,

    /// Root of the install tree (data files are placed relative to it)
    pub install_root: Option<PathBuf>,

    /// Default number of parallel jobs (None = auto-detect)
    pub jobs: Option<usize>,

    /// Always emit compile_commands.json
    #[serde(default)]
    pub emit_compile_commands: bool,
}

/// Interpreter-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonConfig {
    /// Interpreter used to locate headers and pybind11
    pub interpreter: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Toolchain settings
        if other.toolchain.cc.is_some() {
            self.toolchain.cc = other.toolchain.cc;
        }
        if other.toolchain.cxx.is_some() {
            self.toolchain.cxx = other.toolchain.cxx;
        }
        if other.toolchain.link.is_some() {
            self.toolchain.link = other.toolchain.link;
        }
        if other.toolchain.family.is_some() {
            self.toolchain.family = other.toolchain.family;
        }
        if !other.toolchain.cflags.is_empty() {
            self.toolchain.cflags = other.toolchain.cflags;
        }
        if !other.toolchain.ldflags.is_empty() {
            self.toolchain.ldflags = other.toolchain.ldflags;
        }

        // Build settings
        if other.build.profile.is_some() {
            self.build.profile = other.build.profile;
        }
        if other.build.out_dir.is_some() {
            self.build.out_dir = other.build.out_dir;
        }
        if other.build.install_root.is_some() {
            self.build.install_root = other.build.install_root;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.emit_compile_commands {
            self.build.emit_compile_commands = true;
        }

        // Python settings
        if other.python.interpreter.is_some() {
            self.python.interpreter = other.python.interpreter;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.titta/config.toml)
/// 2. Global config (~/.titta/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Load the merged configuration for a project root.
pub fn load_project_config(project_root: &Path) -> Config {
    let global = global_config_path().unwrap_or_default();
    load_config(&global, &project_config_path(project_root))
}

/// Environment variable that relocates the global config directory.
pub const HOME_ENV: &str = "TITTA_HOME";

/// Get the global config directory (`$TITTA_HOME`, else ~/.titta).
pub fn global_config_dir() -> Option<PathBuf> {
    config_dir_from(std::env::var_os(HOME_ENV).map(PathBuf::from))
}

fn config_dir_from(home_override: Option<PathBuf>) -> Option<PathBuf> {
    match home_override {
        Some(dir) if !dir.as_os_str().is_empty() => Some(dir),
        _ => directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR)),
    }
}

/// Get the global config path (~/.titta/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Get the project config path (.titta/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join(CONFIG_FILE)
}
