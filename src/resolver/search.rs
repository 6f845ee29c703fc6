//! Locating existing library installations on the system.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::core::tool::{Tool, VersionProbe};
use crate::util::process::ProcessBuilder;

/// Environment variables contributing search locations, in priority order.
const SEARCH_PATH_VARS: [&str; 4] = [
    "LIBRARY_PATH",
    "PATH",
    "DYLD_LIBRARY_PATH",
    "LD_LIBRARY_PATH",
];

/// Default UNIX library directories, searched after everything else.
const DEFAULT_LIB_DIRS: [&str; 2] = ["/usr/lib", "/usr/local/lib"];

/// Finds an expected artifact of a tool somewhere on the system.
pub trait LibrarySearch {
    /// Path of the first readable artifact found, or `None`.
    fn locate(&self, tool: &Tool) -> Option<PathBuf>;
}

/// Searches environment-derived locations, derived sibling `lib`
/// directories, and finally the default system directories.
#[derive(Debug)]
pub struct SystemSearch {
    locations: Vec<PathBuf>,
}

impl SystemSearch {
    /// Build the location list from the process environment.
    pub fn from_env() -> Self {
        let mut locations = Vec::new();
        for var in SEARCH_PATH_VARS {
            if let Some(value) = std::env::var_os(var) {
                locations.extend(std::env::split_paths(&value));
            }
        }
        Self::with_locations(locations)
    }

    /// Build a searcher over explicit locations; sibling `lib` derivation
    /// and the default directories still apply.
    pub fn with_locations(mut locations: Vec<PathBuf>) -> Self {
        // Look for the lib directories corresponding to the bin ones.
        let mut derived = Vec::new();
        for location in &locations {
            if location.file_name().is_some_and(|name| name == "bin") {
                if let Some(parent) = location.parent() {
                    let lib = parent.join("lib");
                    if lib.is_dir() && !locations.contains(&lib) && !derived.contains(&lib) {
                        derived.push(lib);
                    }
                }
            }
        }
        locations.extend(derived);

        locations.extend(DEFAULT_LIB_DIRS.iter().map(PathBuf::from));
        SystemSearch { locations }
    }
}

impl LibrarySearch for SystemSearch {
    fn locate(&self, tool: &Tool) -> Option<PathBuf> {
        for artifact in &tool.artifacts {
            for location in &self.locations {
                let candidate = location.join(artifact);
                if !is_readable(&candidate) {
                    continue;
                }
                if let Some(probe) = &tool.version_probe {
                    if !probe_matches(probe, location) {
                        // Wrong major release; keep searching.
                        continue;
                    }
                }
                return Some(candidate);
            }
        }
        None
    }
}

/// Existence plus readability, matching what a linker will accept.
fn is_readable(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

/// Run the version helper expected next to a candidate library directory
/// and compare the reported major version.
fn probe_matches(probe: &VersionProbe, lib_dir: &Path) -> bool {
    let Some(root) = lib_dir.parent() else {
        return false;
    };
    let helper = root.join("bin").join(&probe.helper);

    let Ok(output) = ProcessBuilder::new(&helper).arg("--version").exec() else {
        return false;
    };
    if !output.status.success() {
        return false;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    reported_major(&stdout) == Some(probe.major)
}

/// Major version reported by a helper.
///
/// Helpers normally print a semantic version; fall back to the leading
/// integer for the ones that do not.
fn reported_major(output: &str) -> Option<u64> {
    let trimmed = output.trim();
    if let Ok(version) = semver::Version::parse(trimmed) {
        return Some(version.major);
    }

    static LEADING_MAJOR: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(\d+)").expect("static regex"));
    LEADING_MAJOR
        .captures(trimmed)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}
