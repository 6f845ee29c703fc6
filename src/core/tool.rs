//! Catalog entry types.
//!
//! A Tool describes one installable native package: its dependency edges,
//! where it is (to be) installed, which artifacts a finished installation
//! must contain, and where its sources come from.

use std::path::{Path, PathBuf};

/// Where a tool is, or is to be, installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallLocation {
    /// Link against an existing installation if one is found, install otherwise.
    Default,

    /// Explicitly disabled: never linked against, never installed.
    Disabled,

    /// A concrete installation directory (user override or resolved path).
    Path(PathBuf),
}

impl InstallLocation {
    /// Check if this tool is explicitly disabled.
    pub fn is_disabled(&self) -> bool {
        matches!(self, InstallLocation::Disabled)
    }

    /// Check if this tool is still in "install if missing" mode.
    pub fn is_default(&self) -> bool {
        matches!(self, InstallLocation::Default)
    }

    /// Get the concrete installation directory, if one is set.
    pub fn path(&self) -> Option<&Path> {
        match self {
            InstallLocation::Path(p) => Some(p),
            _ => None,
        }
    }
}

/// Where a tool's source tarball comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Tarball fetched over HTTP. The URL may contain a `{version}`
    /// placeholder until catalog templating runs.
    Remote {
        url: String,
        /// Expected SHA-256 of the tarball, verified after download when set.
        sha256: Option<String>,
    },

    /// Tarball already on disk.
    Local(PathBuf),
}

impl SourceSpec {
    /// Create a remote source without a checksum.
    pub fn remote(url: impl Into<String>) -> Self {
        SourceSpec::Remote {
            url: url.into(),
            sha256: None,
        }
    }

    /// Create a local source.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        SourceSpec::Local(path.into())
    }

    /// Check if the source still needs downloading.
    pub fn is_remote(&self) -> bool {
        matches!(self, SourceSpec::Remote { .. })
    }

    /// Get the local tarball path, if the source has been acquired.
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            SourceSpec::Local(p) => Some(p),
            _ => None,
        }
    }
}

/// Version check applied to search-path candidates of version-sensitive
/// libraries.
///
/// The helper executable is expected in the `bin` directory sibling to the
/// candidate's `lib` directory; its reported major version must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionProbe {
    /// Helper executable name (e.g. `lhapdf-config`).
    pub helper: String,

    /// Major version the helper must report.
    pub major: u64,
}

/// Which build outputs `fold` publishes into the shared tree.
///
/// Glob patterns are relative to the tool's install directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldRules {
    /// Executables to link under `<prefix>/bin`.
    pub bin: Vec<String>,

    /// Headers (or modules) to link under `<prefix>/include`.
    pub include: Vec<String>,

    /// Libraries to link under `<prefix>/lib`.
    pub lib: Vec<String>,

    /// Skip shared libraries so dependents link statically.
    pub static_only: bool,
}

impl Default for FoldRules {
    fn default() -> Self {
        FoldRules {
            bin: vec!["bin/*".to_string()],
            include: vec!["include/*".to_string()],
            lib: vec!["lib/*".to_string()],
            static_only: false,
        }
    }
}

impl FoldRules {
    /// Fold rules with custom glob patterns.
    pub fn new(bin: &[&str], include: &[&str], lib: &[&str]) -> Self {
        FoldRules {
            bin: bin.iter().map(|s| s.to_string()).collect(),
            include: include.iter().map(|s| s.to_string()).collect(),
            lib: lib.iter().map(|s| s.to_string()).collect(),
            static_only: false,
        }
    }

    /// Restrict library folding to static archives.
    pub fn static_only(mut self) -> Self {
        self.static_only = true;
        self
    }

    /// Add an extra pattern to the executable set.
    pub fn with_extra_bin(mut self, pattern: &str) -> Self {
        self.bin.push(pattern.to_string());
        self
    }
}

/// One installable tool tracked by the catalog.
#[derive(Debug, Clone)]
pub struct Tool {
    /// Unique tool name.
    pub name: String,

    /// Version string (not necessarily semantic).
    pub version: String,

    /// Dependencies whose absence is fatal.
    pub mandatory_deps: Vec<String>,

    /// Dependencies that are silently dropped when disabled.
    pub optional_deps: Vec<String>,

    /// Where this tool is (to be) installed.
    pub install: InstallLocation,

    /// Expected artifact names. Patterns hold a `{libext}` placeholder
    /// until catalog templating expands them per platform extension.
    pub artifacts: Vec<String>,

    /// Where this tool's sources come from.
    pub source: SourceSpec,

    /// Version check for search-path candidates, when the library is
    /// version-sensitive.
    pub version_probe: Option<VersionProbe>,

    /// Resolved only against the install root, never system search paths.
    pub colocated: bool,

    /// What `fold` publishes into the shared tree.
    pub fold: FoldRules,
}

impl Tool {
    /// Create a tool entry in default install mode.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        source: SourceSpec,
    ) -> Self {
        Tool {
            name: name.into(),
            version: version.into(),
            mandatory_deps: Vec::new(),
            optional_deps: Vec::new(),
            install: InstallLocation::Default,
            artifacts: Vec::new(),
            source,
            version_probe: None,
            colocated: false,
            fold: FoldRules::default(),
        }
    }

    /// Set the mandatory dependency names.
    pub fn with_mandatory_deps(mut self, deps: &[&str]) -> Self {
        self.mandatory_deps = deps.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the optional dependency names.
    pub fn with_optional_deps(mut self, deps: &[&str]) -> Self {
        self.optional_deps = deps.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the expected artifact patterns.
    pub fn with_artifacts(mut self, artifacts: &[&str]) -> Self {
        self.artifacts = artifacts.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Attach a version probe.
    pub fn with_version_probe(mut self, probe: VersionProbe) -> Self {
        self.version_probe = Some(probe);
        self
    }

    /// Mark this tool as resolved against the install root only.
    pub fn colocated(mut self) -> Self {
        self.colocated = true;
        self
    }

    /// Override the fold rules.
    pub fn with_fold(mut self, fold: FoldRules) -> Self {
        self.fold = fold;
        self
    }

    /// Concrete install directory, if one has been resolved.
    pub fn install_path(&self) -> Option<&Path> {
        self.install.path()
    }

    /// Name of this tool's install log file.
    pub fn log_file_name(&self) -> String {
        format!("{}_install.log", self.name)
    }

    /// Full path of this tool's install log, once the install path is known.
    pub fn install_log(&self) -> Option<PathBuf> {
        self.install_path().map(|p| p.join(self.log_file_name()))
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}
