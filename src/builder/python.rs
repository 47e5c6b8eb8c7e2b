//! Python interpreter probing.
//!
//! The extension's pybind11 include directories, the interpreter headers and
//! the module file suffix all depend on the interpreter that will load the
//! module. They are queried from that interpreter once per build.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{IncludeDir, PackageMetadata, Platform};
use crate::util::process::{find_executable, ProcessBuilder};

/// Script printing everything the build needs as a single JSON object.
const INSPECT_SCRIPT: &str = r#"
import json, os, sys, sysconfig
info = {
    "version": "%d.%d.%d" % sys.version_info[:3],
    "include": sysconfig.get_paths()["include"],
    "ext_suffix": sysconfig.get_config_var("EXT_SUFFIX") or "",
    "libs": os.path.join(sys.base_prefix, "libs"),
    "site_packages": os.path.relpath(sysconfig.get_paths()["platlib"], sys.prefix),
    "pybind11": None,
}
try:
    import pybind11
    info["pybind11"] = {
        "version": pybind11.__version__,
        "include": pybind11.get_include(),
        "user_include": pybind11.get_include(True),
    }
except ImportError:
    pass
print(json.dumps(info))
"#;

/// pybind11 as installed for the inspected interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pybind11Info {
    pub version: String,
    pub include: PathBuf,
    pub user_include: PathBuf,
}

/// Facts about the interpreter the extension is built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PythonEnv {
    /// Interpreter executable
    pub interpreter: PathBuf,
    /// Interpreter version (`3.11.4`)
    pub version: String,
    /// Directory holding `Python.h`
    pub include: PathBuf,
    /// Module file suffix (`.cpython-311-x86_64-linux-gnu.so`, `.cp311-win_amd64.pyd`)
    pub ext_suffix: String,
    /// Directory holding the interpreter's import libraries (Windows)
    pub libs: PathBuf,
    /// Module install directory, relative to the interpreter prefix
    pub site_packages: PathBuf,
    /// pybind11, when importable
    pub pybind11: Option<Pybind11Info>,
}

impl PythonEnv {
    /// Run the inspection script with an interpreter.
    pub fn inspect(interpreter: &Path) -> Result<Self> {
        let output = ProcessBuilder::new(interpreter)
            .arg("-c")
            .arg(INSPECT_SCRIPT)
            .exec_and_check()
            .with_context(|| format!("failed to query interpreter `{}`", interpreter.display()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut env = Self::parse(&stdout)?;
        env.interpreter = interpreter.to_path_buf();

        tracing::debug!(
            "Python {} at {} (pybind11: {})",
            env.version,
            env.interpreter.display(),
            env.pybind11
                .as_ref()
                .map(|p| p.version.as_str())
                .unwrap_or("not installed")
        );

        Ok(env)
    }

    /// Parse the JSON printed by the inspection script.
    pub fn parse(stdout: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Report {
            version: String,
            include: PathBuf,
            ext_suffix: String,
            libs: PathBuf,
            site_packages: PathBuf,
            pybind11: Option<Pybind11Info>,
        }

        let line = stdout
            .lines()
            .rev()
            .find(|l| l.trim_start().starts_with('{'))
            .context("interpreter inspection printed no JSON")?;

        let report: Report =
            serde_json::from_str(line).context("failed to parse interpreter inspection output")?;

        Ok(PythonEnv {
            interpreter: PathBuf::new(),
            version: report.version,
            include: report.include,
            ext_suffix: report.ext_suffix,
            libs: report.libs,
            site_packages: report.site_packages,
            pybind11: report.pybind11,
        })
    }

    /// File name of the compiled module (`TittaPy.cpython-311-x86_64-linux-gnu.so`).
    pub fn module_file_name(&self, module: &str, platform: Platform) -> String {
        if self.ext_suffix.is_empty() {
            let ext = match platform {
                Platform::Windows => ".pyd",
                Platform::Linux | Platform::MacOs => ".so",
            };
            format!("{}{}", module, ext)
        } else {
            format!("{}{}", module, self.ext_suffix)
        }
    }

    /// Resolve an extension's include list into concrete directories.
    ///
    /// Deferred pybind11 entries become pybind11's include directories,
    /// duplicates are dropped keeping the first occurrence, and the
    /// interpreter's own include directory is appended.
    pub fn resolve_include_dirs(&self, include_dirs: &[IncludeDir]) -> Result<Vec<PathBuf>> {
        let mut resolved: Vec<PathBuf> = Vec::new();

        for dir in include_dirs {
            let path = match dir {
                IncludeDir::Path(p) => p.clone(),
                IncludeDir::Pybind11 { user } => {
                    let Some(ref pybind11) = self.pybind11 else {
                        bail!(
                            "pybind11 is not installed for `{}`\n\
                             help: Run `{} -m pip install pybind11`",
                            self.interpreter.display(),
                            self.interpreter.display()
                        );
                    };
                    if *user {
                        pybind11.user_include.clone()
                    } else {
                        pybind11.include.clone()
                    }
                }
            };

            if !resolved.contains(&path) {
                resolved.push(path);
            }
        }

        if !resolved.contains(&self.include) {
            resolved.push(self.include.clone());
        }

        Ok(resolved)
    }

    /// Library directories the interpreter contributes on a platform.
    pub fn library_dirs(&self, platform: Platform) -> Vec<PathBuf> {
        match platform {
            Platform::Windows => vec![self.libs.clone()],
            Platform::Linux | Platform::MacOs => Vec::new(),
        }
    }

    /// Check the interpreter and pybind11 against the package requirements.
    pub fn check_requirements(&self, metadata: &PackageMetadata) -> Result<()> {
        if let Some(ref py) = metadata.python_requires {
            if py.matches(&self.version) == Some(false) {
                bail!(
                    "{} requires Python {}, but `{}` is Python {}",
                    metadata.name,
                    py.req,
                    self.interpreter.display(),
                    self.version
                );
            }
        }

        for req in &metadata.setup_requires {
            if req.name != "pybind11" {
                continue;
            }
            match &self.pybind11 {
                None => bail!(
                    "{} requires {} at build time, but it is not installed\n\
                     help: Run `{} -m pip install \"{}\"`",
                    metadata.name,
                    req,
                    self.interpreter.display(),
                    req
                ),
                Some(info) => match req.matches(&info.version) {
                    Some(true) => {}
                    Some(false) => bail!(
                        "{} requires {}, found pybind11 {}",
                        metadata.name,
                        req,
                        info.version
                    ),
                    None => tracing::warn!(
                        "Could not parse pybind11 version `{}`, skipping check",
                        info.version
                    ),
                },
            }
        }

        Ok(())
    }
}

/// Find the interpreter to build for.
///
/// Priority: explicit path (CLI or config), `PYTHON`, then `python3` and
/// `python` on PATH.
pub fn find_interpreter(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(python) = std::env::var("PYTHON") {
        return Ok(PathBuf::from(python));
    }

    for name in ["python3", "python"] {
        if let Some(path) = find_executable(name) {
            return Ok(path);
        }
    }

    bail!(
        "no Python interpreter found\n\
         help: Set the PYTHON environment variable or `interpreter` under [python] in .titta/config.toml"
    )
}
