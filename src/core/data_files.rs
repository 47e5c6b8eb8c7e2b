//! Vendor shared libraries installed next to the extension.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Destination directory -> files copied verbatim into it.
///
/// Destinations are kept as written (they may use either path separator);
/// [`destination_path`] turns one into a native relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataFileManifest {
    entries: BTreeMap<String, Vec<PathBuf>>,
}

impl DataFileManifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        DataFileManifest::default()
    }

    /// Create a manifest holding a single entry.
    pub fn single(destination: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        let mut manifest = DataFileManifest::new();
        manifest.insert(destination, source);
        manifest
    }

    /// Add a source file under a destination directory.
    pub fn insert(&mut self, destination: impl Into<String>, source: impl Into<PathBuf>) {
        self.entries
            .entry(destination.into())
            .or_default()
            .push(source.into());
    }

    /// Iterate over `(destination, sources)` pairs in destination order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.entries
            .iter()
            .map(|(dest, files)| (dest.as_str(), files.as_slice()))
    }

    /// Number of destination entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is installed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of files across all destinations.
    pub fn file_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

/// Convert a destination as written (`lib\site-packages\`, `lib/site-packages/`)
/// into a relative path using the native separator.
pub fn destination_path(destination: &str) -> PathBuf {
    destination
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .collect()
}

/// Strip a leading `./` from a manifest source path.
pub fn normalize_source(source: &Path) -> PathBuf {
    source
        .strip_prefix(".")
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| source.to_path_buf())
}
