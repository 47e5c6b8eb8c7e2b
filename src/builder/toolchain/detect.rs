//! Toolchain detection functions.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use which::which;

use crate::core::{CompilerFamily, Platform};
use crate::util::config::ToolchainSettings;

use super::{GccToolchain, MsvcToolchain, Toolchain};

/// Detect the available toolchain.
///
/// Tries to find a C++ compiler with the following priority:
/// 1. Toolchain settings from the config files
/// 2. Environment variables (CXX, then CC)
/// 3. On Windows: `cl.exe` from a Developer Command Prompt
/// 4. Elsewhere: c++/g++/clang++ on PATH
pub fn detect_toolchain(
    settings: &ToolchainSettings,
    platform: Platform,
) -> Result<Box<dyn Toolchain>> {
    if settings.has_compiler() {
        if let Some(toolchain) = try_detect_from_config(settings, platform)? {
            return Ok(toolchain);
        }
    }

    if let Some(toolchain) = try_detect_from_env(platform)? {
        return Ok(toolchain);
    }

    if platform == Platform::Windows {
        if let Some(toolchain) = try_detect_msvc()? {
            return Ok(toolchain);
        }
    }

    if let Some(toolchain) = try_detect_gcc(platform) {
        return Ok(toolchain);
    }

    bail!(
        "no C++ compiler found\n\
         \n\
         Building the extension requires a C++ compiler (g++, clang++, or cl).\n\
         Set the CXX environment variable, set `cxx` under [toolchain] in .titta/config.toml,\n\
         or install a compiler."
    )
}

/// Guess the compiler family from a compiler path.
///
/// `cl` and `clang-cl` take MSVC-style flags; everything else is treated as
/// a Unix-like driver.
pub fn family_from_compiler(compiler: &Path) -> CompilerFamily {
    let stem = compiler
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    if stem == "cl" || stem == "clang-cl" {
        CompilerFamily::Msvc
    } else {
        CompilerFamily::Unix
    }
}

/// Build a toolchain for a known compiler, honouring an explicit family.
fn toolchain_for(
    cxx: PathBuf,
    family: CompilerFamily,
    link: Option<PathBuf>,
    platform: Platform,
) -> Box<dyn Toolchain> {
    match family {
        CompilerFamily::Msvc => {
            let link = link
                .or_else(|| which("link").ok())
                .unwrap_or_else(|| PathBuf::from("link.exe"));
            Box::new(MsvcToolchain::new(cxx, link))
        }
        CompilerFamily::Unix => Box::new(GccToolchain::new(cxx, platform)),
    }
}

/// Try to create a toolchain from config file settings.
fn try_detect_from_config(
    settings: &ToolchainSettings,
    platform: Platform,
) -> Result<Option<Box<dyn Toolchain>>> {
    let cxx = match (&settings.cxx, &settings.cc) {
        (Some(cxx), _) => cxx.clone(),
        (None, Some(cc)) => GccToolchain::infer_cxx(cc),
        (None, None) => return Ok(None),
    };

    let Some(cxx) = resolve_program(&cxx) else {
        tracing::warn!("Configured C++ compiler not found: {}", cxx.display());
        return Ok(None);
    };

    let family = match &settings.family {
        Some(family) => family.parse::<CompilerFamily>()?,
        None => family_from_compiler(&cxx),
    };

    tracing::info!(
        "Using toolchain from config: cxx={} ({})",
        cxx.display(),
        family
    );

    Ok(Some(toolchain_for(cxx, family, settings.link.clone(), platform)))
}

/// Try CXX, then CC, from the environment.
fn try_detect_from_env(platform: Platform) -> Result<Option<Box<dyn Toolchain>>> {
    let cxx = if let Ok(cxx) = std::env::var("CXX") {
        PathBuf::from(cxx)
    } else if let Ok(cc) = std::env::var("CC") {
        GccToolchain::infer_cxx(Path::new(&cc))
    } else {
        return Ok(None);
    };

    let Some(resolved) = resolve_program(&cxx) else {
        tracing::warn!("Compiler from environment not found: {}", cxx.display());
        return Ok(None);
    };

    let family = family_from_compiler(&resolved);
    tracing::debug!("Using compiler from environment: {}", resolved.display());

    Ok(Some(toolchain_for(resolved, family, None, platform)))
}

/// Use `cl.exe` when running inside a Developer Command Prompt.
fn try_detect_msvc() -> Result<Option<Box<dyn Toolchain>>> {
    let Ok(cl) = which("cl") else {
        return Ok(None);
    };

    if std::env::var("INCLUDE").is_err() || std::env::var("LIB").is_err() {
        tracing::debug!(
            "Found {} but INCLUDE/LIB are not set; run from a Developer Command Prompt",
            cl.display()
        );
        return Ok(None);
    }

    let link = which("link")
        .map_err(|_| anyhow::anyhow!("MSVC cl.exe found but link.exe not in PATH"))?;

    tracing::debug!("Detected MSVC: cl={}", cl.display());
    Ok(Some(Box::new(MsvcToolchain::new(cl, link))))
}

/// Try to detect a GCC/Clang driver on PATH.
fn try_detect_gcc(platform: Platform) -> Option<Box<dyn Toolchain>> {
    let cxx = which("c++")
        .or_else(|_| which("g++"))
        .or_else(|_| which("clang++"))
        .ok()?;

    tracing::debug!("Detected C++ compiler: {}", cxx.display());
    Some(Box::new(GccToolchain::new(cxx, platform)))
}

/// Resolve a program name or path to an existing executable.
fn resolve_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return program.exists().then(|| program.to_path_buf());
    }
    which(program).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_from_compiler() {
        assert_eq!(family_from_compiler(Path::new("cl.exe")), CompilerFamily::Msvc);
        assert_eq!(family_from_compiler(Path::new("CL")), CompilerFamily::Msvc);
        assert_eq!(
            family_from_compiler(Path::new("C:/LLVM/bin/clang-cl.exe")),
            CompilerFamily::Msvc
        );
        assert_eq!(family_from_compiler(Path::new("/usr/bin/g++")), CompilerFamily::Unix);
        assert_eq!(family_from_compiler(Path::new("clang++")), CompilerFamily::Unix);
    }

    #[test]
    fn test_config_with_missing_compiler_is_skipped() {
        let settings = ToolchainSettings {
            cxx: Some(PathBuf::from("/nonexistent/bin/g++")),
            ..Default::default()
        };

        let detected = try_detect_from_config(&settings, Platform::Linux).unwrap();
        assert!(detected.is_none());
    }

    #[test]
    fn test_config_with_bad_family_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cxx = tmp.path().join("g++");
        std::fs::write(&cxx, "").unwrap();

        let settings = ToolchainSettings {
            cxx: Some(cxx),
            family: Some("borland".to_string()),
            ..Default::default()
        };

        let err = try_detect_from_config(&settings, Platform::Linux).err().unwrap();
        assert!(err.to_string().contains("borland"));
    }

    #[test]
    fn test_config_family_override() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cxx = tmp.path().join("clang-cl");
        std::fs::write(&cxx, "").unwrap();

        let settings = ToolchainSettings {
            cxx: Some(cxx.clone()),
            link: Some(PathBuf::from("lld-link")),
            ..Default::default()
        };

        let tc = try_detect_from_config(&settings, Platform::Windows)
            .unwrap()
            .unwrap();
        assert_eq!(tc.family(), CompilerFamily::Msvc);
        assert_eq!(tc.compiler_path(), cxx.as_path());
    }
}
