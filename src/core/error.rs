//! Configuration error types.

use thiserror::Error;

/// Error raised while turning configuration inputs into a build configuration.
///
/// Only the inputs of the configurator are validated here. Missing vendor
/// libraries, missing compilers and link failures are reported by the
/// toolchain when the build actually runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigureError {
    #[error("unsupported platform `{identifier}` (expected an identifier starting with `win`, `linux`, `darwin` or `macos`)")]
    UnsupportedPlatform { identifier: String },

    #[error("unknown compiler family `{family}` (expected `msvc` or `unix`)")]
    UnknownCompilerFamily { family: String },

    #[error("unknown profile `{name}` (available: {available})")]
    UnknownProfile { name: String, available: String },
}

impl ConfigureError {
    /// A one-line hint shown below the error by the CLI.
    pub fn help(&self) -> &'static str {
        match self {
            ConfigureError::UnsupportedPlatform { .. } => {
                "help: pass `--platform windows|linux|macos` to configure for a supported host"
            }
            ConfigureError::UnknownCompilerFamily { .. } => {
                "help: pass `--family msvc` or `--family unix`"
            }
            ConfigureError::UnknownProfile { .. } => {
                "help: run `titta-build configure --profile titta` for the default package"
            }
        }
    }
}
