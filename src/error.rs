//! Fatal error kinds and their process exit codes.
//!
//! Every variant is terminal for the current run: the orchestrator unwinds
//! the whole call stack and the binary exits with the matching code.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Exit code for any fatal resolution, download, build, or verification failure.
pub const EXIT_FATAL: i32 = 9;

/// Exit code for usage errors, `--help`, and a missing command.
pub const EXIT_USAGE: i32 = 2;

/// Exit code when the target is already installed and `--force` was not given.
pub const EXIT_EXISTING: i32 = 66;

/// A fatal installation failure.
#[derive(Debug, Error)]
pub enum InstallError {
    /// A mandatory dependency was explicitly disabled by the user.
    #[error("mandatory `{tool}` dependency `{dependency}` is unavailable")]
    MandatoryDependencyDisabled { tool: String, dependency: String },

    /// The family decision table was exhausted without a match.
    #[error("inconsistent `{alias}` setup, the resolver should have never reached this point")]
    InconsistentFamilyResolution { alias: String },

    #[error("could not download sources from `{url}`")]
    DownloadFailure {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// The builder ran but the expected artifacts never appeared.
    #[error("a problem occurred during the installation of `{tool}`")]
    BuildFailure {
        tool: String,
        /// Install log to surface to the user, when one was written.
        log: Option<PathBuf>,
    },

    #[error("`{name}` is not a known tool")]
    UnknownTool { name: String },

    #[error("unsupported value `{value}` for option `{option}`")]
    UnsupportedOption { option: String, value: String },

    #[error("`{path}` already contains an installation of `{tool}`")]
    ExistingInstallation { tool: String, path: PathBuf },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InstallError {
    /// Map this failure to the process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            InstallError::ExistingInstallation { .. } => EXIT_EXISTING,
            _ => EXIT_FATAL,
        }
    }

    /// Install log associated with this failure, if any.
    pub fn log_path(&self) -> Option<&Path> {
        match self {
            InstallError::BuildFailure { log, .. } => log.as_deref(),
            _ => None,
        }
    }
}
