//! Package metadata attached to the built distribution.

use std::fmt;
use std::path::PathBuf;

use semver::{Comparator, Op, Prerelease, Version, VersionReq};
use serde::{Deserialize, Serialize};

/// A named requirement such as `pybind11>=2.10.1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Distribution name
    pub name: String,
    /// Version constraint
    pub req: VersionReq,
}

impl Requirement {
    /// Create a `name>=major.minor[.patch]` requirement.
    pub fn at_least(name: &str, major: u64, minor: u64, patch: Option<u64>) -> Self {
        Requirement {
            name: name.to_string(),
            req: VersionReq {
                comparators: vec![Comparator {
                    op: Op::GreaterEq,
                    major,
                    minor: Some(minor),
                    patch,
                    pre: Prerelease::EMPTY,
                }],
            },
        }
    }

    /// Check an inspected version string against this requirement.
    ///
    /// Versions with fewer than three components (`3.8`) are padded, and
    /// anything after the numeric release (`2.11.0.dev1`, `3.12.0rc2`) is
    /// ignored.
    pub fn matches(&self, version: &str) -> Option<bool> {
        parse_release(version).map(|v| self.req.matches(&v))
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // VersionReq renders `>=2.10.1`, which is also valid PEP 508
        write!(f, "{}{}", self.name, self.req)
    }
}

/// Parse the numeric release part of a version string.
pub fn parse_release(version: &str) -> Option<Version> {
    let mut parts = [0u64; 3];
    let mut seen = 0;

    for (i, part) in version.trim().split('.').take(3).enumerate() {
        let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            break;
        }
        parts[i] = digits.parse().ok()?;
        seen += 1;
        if digits.len() != part.len() {
            break;
        }
    }

    if seen == 0 {
        return None;
    }
    Some(Version::new(parts[0], parts[1], parts[2]))
}

/// A pure-Python package shipped alongside the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PythonPackage {
    /// Import name of the package
    pub name: String,
    /// Directory holding the package directory, relative to the project root
    pub root: PathBuf,
}

/// Distribution metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    /// Version literal, used verbatim in `VERSION_INFO`
    pub version: String,
    pub author: String,
    pub author_email: String,
    pub url: String,
    pub description: String,
    /// Space-separated keywords
    pub keywords: String,
    /// Minimum interpreter version
    pub python_requires: Option<Requirement>,
    /// Requirements needed at build time
    pub setup_requires: Vec<Requirement>,
    /// Requirements installed with the package
    pub install_requires: Vec<Requirement>,
    /// Pure-Python packages installed with the extension
    #[serde(default)]
    pub packages: Vec<PythonPackage>,
    /// Whether the distribution may be imported from a zip archive
    pub zip_safe: Option<bool>,
}

impl PackageMetadata {
    /// Render the metadata in core-metadata (`PKG-INFO`) format.
    pub fn to_pkg_info(&self) -> String {
        let mut out = String::new();
        out.push_str("Metadata-Version: 2.1\n");
        out.push_str(&format!("Name: {}\n", self.name));
        out.push_str(&format!("Version: {}\n", self.version));
        out.push_str(&format!("Summary: {}\n", self.description));
        out.push_str(&format!("Home-page: {}\n", self.url));
        out.push_str(&format!("Author: {}\n", self.author));
        out.push_str(&format!("Author-email: {}\n", self.author_email));
        if !self.keywords.is_empty() {
            out.push_str(&format!("Keywords: {}\n", self.keywords));
        }
        if let Some(ref py) = self.python_requires {
            out.push_str(&format!("Requires-Python: {}\n", py.req));
        }
        for req in &self.install_requires {
            out.push_str(&format!("Requires-Dist: {}\n", req));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release() {
        assert_eq!(parse_release("3.11.4"), Some(Version::new(3, 11, 4)));
        assert_eq!(parse_release("3.8"), Some(Version::new(3, 8, 0)));
        assert_eq!(parse_release("2.11.0.dev1"), Some(Version::new(2, 11, 0)));
        assert_eq!(parse_release("3.12.0rc2"), Some(Version::new(3, 12, 0)));
        assert_eq!(parse_release("dev"), None);
    }

    #[test]
    fn test_requirement_matches() {
        let req = Requirement::at_least("pybind11", 2, 10, Some(1));
        assert_eq!(req.matches("2.10.1"), Some(true));
        assert_eq!(req.matches("2.11.1"), Some(true));
        assert_eq!(req.matches("2.9.2"), Some(false));
        assert_eq!(req.matches("unknown"), None);
    }

    #[test]
    fn test_requirement_display() {
        let req = Requirement::at_least("pybind11", 2, 10, Some(1));
        assert_eq!(req.to_string(), "pybind11>=2.10.1");

        let py = Requirement::at_least("python", 3, 8, None);
        assert_eq!(py.req.to_string(), ">=3.8");
        assert_eq!(py.matches("3.8.10"), Some(true));
        assert_eq!(py.matches("3.7.9"), Some(false));
    }
}
