//! The native extension build target.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Source language for an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// C++ language
    #[default]
    #[serde(rename = "c++", alias = "cpp", alias = "cxx")]
    Cxx,
}

impl Language {
    /// Get the language name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Cxx => "c++",
        }
    }
}

/// An include directory of the extension.
///
/// The pybind11 header locations depend on the interpreter that runs the
/// build, so they stay symbolic until a build resolves them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncludeDir {
    /// A fixed path, relative to the project root.
    Path(PathBuf),
    /// pybind11's headers (`user = true` selects the per-user install).
    Pybind11 { user: bool },
}

impl IncludeDir {
    /// Create a fixed include directory.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        IncludeDir::Path(path.into())
    }
}

impl fmt::Display for IncludeDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncludeDir::Path(p) => write!(f, "{}", p.display()),
            IncludeDir::Pybind11 { user: false } => f.write_str("<pybind11 include>"),
            IncludeDir::Pybind11 { user: true } => f.write_str("<pybind11 user include>"),
        }
    }
}

/// A named native extension: its sources, search paths and language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDescriptor {
    /// Module name (the importable name of the compiled extension)
    pub name: String,
    /// Source files, in compilation order
    pub sources: Vec<PathBuf>,
    /// Include directories, in search order
    pub include_dirs: Vec<IncludeDir>,
    /// Library search directories, in search order
    pub library_dirs: Vec<PathBuf>,
    /// Implementation language
    pub language: Language,
}

impl ExtensionDescriptor {
    /// Create a C++ extension with the standard pybind11 include layout.
    ///
    /// Include order is pybind11 (system), pybind11 (user), then the given
    /// project directories.
    pub fn pybind11(
        name: impl Into<String>,
        sources: &[&str],
        include_dirs: &[&str],
        library_dirs: &[&str],
    ) -> Self {
        let mut includes = vec![
            IncludeDir::Pybind11 { user: false },
            IncludeDir::Pybind11 { user: true },
        ];
        includes.extend(include_dirs.iter().map(IncludeDir::path));

        ExtensionDescriptor {
            name: name.into(),
            sources: sources.iter().map(PathBuf::from).collect(),
            include_dirs: includes,
            library_dirs: library_dirs.iter().map(PathBuf::from).collect(),
            language: Language::Cxx,
        }
    }

    /// Name of the module initialisation symbol exported by the extension.
    pub fn init_symbol(&self) -> String {
        format!("PyInit_{}", self.name)
    }
}
