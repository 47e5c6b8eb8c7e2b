//! Compiler and linker flag tables.

use serde::{Deserialize, Serialize};

use crate::core::platform::CompilerFamily;

/// Ordered compile flags and ordered link flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlagSet {
    pub compile: Vec<String>,
    pub link: Vec<String>,
}

impl FlagSet {
    /// Create a flag set from string slices.
    pub fn new(compile: &[&str], link: &[&str]) -> Self {
        FlagSet {
            compile: compile.iter().map(|s| s.to_string()).collect(),
            link: link.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// How the version string is quoted inside the `VERSION_INFO` definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefineQuoting {
    /// `VERSION_INFO="1.0.0"`
    #[default]
    Plain,
    /// `VERSION_INFO=\"1.0.0\"`
    Escaped,
}

/// Flags of one compiler family, before the version definition is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyFlags {
    pub base: FlagSet,
    /// Quoting of the version definition
    pub quoting: DefineQuoting,
    /// Compile flags that follow the version definition
    pub after_define: Vec<String>,
}

impl FamilyFlags {
    /// Create family flags with a plain version definition and nothing after it.
    pub fn new(compile: &[&str], link: &[&str]) -> Self {
        FamilyFlags {
            base: FlagSet::new(compile, link),
            quoting: DefineQuoting::Plain,
            after_define: Vec::new(),
        }
    }

    /// Set the quoting of the version definition.
    pub fn with_quoting(mut self, quoting: DefineQuoting) -> Self {
        self.quoting = quoting;
        self
    }

    /// Compile flags placed after the version definition.
    pub fn with_after_define(mut self, flags: &[&str]) -> Self {
        self.after_define = flags.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// The complete flag table for one platform: one entry per compiler family.
///
/// Built whole for the platform it describes; nothing appends to it later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagTable {
    pub msvc: FamilyFlags,
    pub unix: FamilyFlags,
}

impl FlagTable {
    /// Get the entry for a compiler family.
    pub fn get(&self, family: CompilerFamily) -> &FamilyFlags {
        match family {
            CompilerFamily::Msvc => &self.msvc,
            CompilerFamily::Unix => &self.unix,
        }
    }

    /// Final flags for a family: the base table, the version definition,
    /// then any flags that must follow it.
    pub fn resolve(&self, family: CompilerFamily, version: &str) -> FlagSet {
        let entry = self.get(family);

        let mut flags = entry.base.clone();
        flags
            .compile
            .push(version_define(family, version, entry.quoting));
        flags.compile.extend(entry.after_define.iter().cloned());
        flags
    }
}

/// The `VERSION_INFO` preprocessor definition in the family's flag syntax.
pub fn version_define(family: CompilerFamily, version: &str, quoting: DefineQuoting) -> String {
    let prefix = family.define_prefix();
    match quoting {
        DefineQuoting::Plain => format!("{}VERSION_INFO=\"{}\"", prefix, version),
        DefineQuoting::Escaped => format!("{}VERSION_INFO=\\\"{}\\\"", prefix, version),
    }
}
