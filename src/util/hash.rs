//! SHA-256 helpers: installed-file digests and configuration fingerprints.

use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Hex SHA-256 of a file, as recorded for every file an install writes.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("failed to hash {}", path.display()))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Digest over an ordered list of configuration fields.
///
/// Each field is terminated by a NUL byte, so `["-O3", "-flto"]` and
/// `["-O3-flto"]` give different fingerprints.
#[derive(Default)]
pub struct Fingerprint(Sha256);

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_str(&mut self, field: &str) -> &mut Self {
        self.0.update(field.as_bytes());
        self.0.update([0u8]);
        self
    }

    pub fn update_strs<'a>(&mut self, fields: impl IntoIterator<Item = &'a str>) -> &mut Self {
        for field in fields {
            self.update_str(field);
        }
        self
    }

    /// Full 64-digit hex digest.
    pub fn finish(self) -> String {
        hex::encode(self.0.finalize())
    }

    /// The first 16 hex digits, as shown by `configure`.
    pub fn finish_short(self) -> String {
        let mut digest = self.finish();
        digest.truncate(16);
        digest
    }
}
