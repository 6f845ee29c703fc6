//! Dependency-edge resolution.
//!
//! `classify` decides, for a single dependency edge, whether an existing
//! installation can be reused, the dependency must be installed, or the
//! dependency is disabled. `resolve_family` lifts that decision over a
//! version family.

pub mod family;
pub mod search;

use std::path::{Path, PathBuf};

pub use family::{resolve_family, FamilyChoice};
pub use search::{LibrarySearch, SystemSearch};

use crate::core::{Catalog, InstallLocation};
use crate::error::InstallError;

/// Outcome of evaluating one dependency edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The dependency is explicitly disabled.
    Disabled,

    /// An existing installation was found at this path.
    Satisfied(PathBuf),

    /// No existing installation; the dependency must be installed.
    MustInstall,
}

/// Classify one dependency edge.
///
/// Explicit overrides are trusted without touching the filesystem; default
/// mode first looks for a previously completed local install under the
/// prefix, then hands over to the searcher.
pub fn classify(
    catalog: &Catalog,
    dependency: &str,
    prefix: &Path,
    search: &dyn LibrarySearch,
) -> Result<Resolution, InstallError> {
    let tool = catalog.expect_tool(dependency)?;

    match &tool.install {
        InstallLocation::Disabled => Ok(Resolution::Disabled),

        // Trust the user.
        InstallLocation::Path(path) => Ok(Resolution::Satisfied(path.clone())),

        InstallLocation::Default => {
            let local = prefix.join(&tool.name);
            let locally_installed = tool.artifacts.iter().any(|artifact| {
                local.join("lib").join(artifact).is_file()
                    || (tool.colocated && local.join(artifact).is_file())
            });
            if locally_installed {
                return Ok(Resolution::Satisfied(local));
            }

            // Colocated tools are never picked up from system search paths.
            if tool.colocated {
                return Ok(Resolution::MustInstall);
            }

            match search.locate(tool) {
                Some(lib_file) => Ok(Resolution::Satisfied(install_root_of(&lib_file))),
                None => Ok(Resolution::MustInstall),
            }
        }
    }
}

/// Derive an installation root from a located library file.
///
/// `<root>/lib/libfoo.so` maps to `<root>`; a flat layout maps to the
/// containing directory.
fn install_root_of(lib_file: &Path) -> PathBuf {
    let dir = lib_file.parent().unwrap_or(Path::new("."));
    if dir.file_name().is_some_and(|name| name == "lib") {
        dir.parent().unwrap_or(dir).to_path_buf()
    } else {
        dir.to_path_buf()
    }
}
