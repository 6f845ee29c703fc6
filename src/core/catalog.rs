//! The tool catalog.
//!
//! One entry per known tool, populated from built-in defaults plus user
//! overrides, then templated exactly once before any resolution begins.
//! The catalog is owned by the resolution context of a single top-level
//! install and mutated in place as dependencies are resolved.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::family::Family;
use crate::core::platform;
use crate::core::tool::{FoldRules, InstallLocation, SourceSpec, Tool, VersionProbe};
use crate::error::InstallError;

/// Install-root placeholder accepted in explicit path overrides.
pub const PREFIX_PLACEHOLDER: &str = "{prefix}";

/// Version placeholder substituted into remote URL templates.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Library-extension placeholder expanded in artifact patterns.
pub const LIBEXT_PLACEHOLDER: &str = "{libext}";

/// Static store of tool metadata.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tools: Vec<Tool>,
    families: Vec<Family>,
    finalized: bool,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// The built-in catalog of known tools.
    pub fn builtin() -> Self {
        let mut catalog = Catalog::new();

        catalog.insert(
            Tool::new(
                "hepmc",
                "2.06.09",
                SourceSpec::remote(
                    "http://lcgapp.cern.ch/project/simu/HepMC/download/HepMC-{version}.tar.gz",
                ),
            )
            .with_artifacts(&["libHepMC.{libext}"]),
        );

        catalog.insert(
            Tool::new(
                "boost",
                "1.59.0",
                SourceSpec::remote(
                    "http://sourceforge.net/projects/boost/files/boost/1.59.0/boost_1_59_0.tar.gz",
                ),
            )
            .with_artifacts(&["libboost_system-mt.{libext}", "libboost_system.{libext}"]),
        );

        catalog.insert(
            Tool::new(
                "pythia8",
                "82151",
                SourceSpec::remote("http://slac.stanford.edu/~prestel/pythia82151.tar.gz"),
            )
            // zlib is mandatory: .lhe event files are handed over compressed.
            .with_mandatory_deps(&["hepmc", "zlib"])
            .with_optional_deps(&["lhapdf"])
            .with_artifacts(&["libpythia8.{libext}"]),
        );

        catalog.insert(
            Tool::new(
                "lhapdf6",
                "6.1.5",
                SourceSpec::remote(
                    "http://www.hepforge.org/archive/lhapdf/LHAPDF-{version}.tar.gz",
                ),
            )
            .with_mandatory_deps(&["boost"])
            .with_artifacts(&["libLHAPDF.{libext}"])
            .with_version_probe(VersionProbe {
                helper: "lhapdf-config".to_string(),
                major: 6,
            }),
        );

        catalog.insert(
            Tool::new(
                "lhapdf5",
                "5.9.0",
                SourceSpec::remote(
                    "http://www.hepforge.org/archive/lhapdf/lhapdf-{version}.tar.gz",
                ),
            )
            .with_artifacts(&["libLHAPDF.{libext}"])
            .with_version_probe(VersionProbe {
                helper: "lhapdf-config".to_string(),
                major: 5,
            }),
        );

        catalog.insert(
            Tool::new(
                "zlib",
                "1.2.8",
                SourceSpec::remote("http://zlib.net/zlib-{version}.tar.gz"),
            )
            .with_artifacts(&["libz.{libext}", "libz.1.{libext}", "libz.1.2.8.{libext}"]),
        );

        catalog.insert(
            Tool::new(
                "mg5amc_py8_interface",
                "1.0",
                SourceSpec::remote(
                    "http://madgraph.phys.ucl.ac.be/Downloads/MG5aMC_PY8_interface.tar.gz",
                ),
            )
            .with_mandatory_deps(&["pythia8"])
            .with_artifacts(&["MG5aMC_PY8_interface"])
            .with_fold(FoldRules::default().with_extra_bin("MG5aMC_PY8_interface")),
        );

        catalog.insert(
            Tool::new(
                "ninja",
                "1.1",
                SourceSpec::remote(
                    "https://bitbucket.org/peraro/ninja/downloads/ninja-latest.tar.gz",
                ),
            )
            .with_mandatory_deps(&["oneloop"])
            .with_artifacts(&["libninja.{libext}"])
            // Dependents must link Ninja statically.
            .with_fold(FoldRules::default().static_only()),
        );

        catalog.insert(
            Tool::new(
                "oneloop",
                "3.6",
                SourceSpec::remote(
                    "http://helac-phegas.web.cern.ch/helac-phegas/tar-files/OneLOop-{version}.tgz",
                ),
            )
            .with_artifacts(&["libavh_olo.a"])
            .colocated()
            // OneLOop installs flat: modules and the archive sit in its root.
            .with_fold(FoldRules::new(&[], &["*.mod"], &["libavh_olo.a"])),
        );

        catalog.add_family(Family::new("lhapdf", ["lhapdf5", "lhapdf6"], "lhapdf6"));

        catalog
    }

    /// Add a tool entry.
    pub fn insert(&mut self, tool: Tool) {
        self.tools.push(tool);
    }

    /// Add a family.
    pub fn add_family(&mut self, family: Family) {
        self.families.push(family);
    }

    /// Look up a tool by name.
    pub fn tool(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Look up a tool by name, mutably.
    pub fn tool_mut(&mut self, name: &str) -> Option<&mut Tool> {
        self.tools.iter_mut().find(|t| t.name == name)
    }

    /// Look up a tool, failing with `UnknownTool` if absent.
    pub fn expect_tool(&self, name: &str) -> Result<&Tool, InstallError> {
        self.tool(name).ok_or_else(|| InstallError::UnknownTool {
            name: name.to_string(),
        })
    }

    /// Check if a tool name (not a family alias) is known.
    pub fn contains(&self, name: &str) -> bool {
        self.tool(name).is_some()
    }

    /// Look up a family by its alias.
    pub fn family(&self, alias: &str) -> Option<&Family> {
        self.families.iter().find(|f| f.alias == alias)
    }

    /// Iterate all tool entries in catalog order.
    pub fn tools(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    /// Iterate all families.
    pub fn families(&self) -> impl Iterator<Item = &Family> {
        self.families.iter()
    }

    /// Check if templating has run.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Record a user install-location override for a tool.
    ///
    /// `off` disables the tool, `default` resets it to install-if-missing,
    /// anything else is an explicit path (a `{prefix}` placeholder is
    /// substituted during `finalize`).
    pub fn set_location_override(&mut self, name: &str, value: &str) -> Result<(), InstallError> {
        let tool = self.tool_mut(name).ok_or_else(|| InstallError::UnknownTool {
            name: name.to_string(),
        })?;
        tool.install = match value {
            "off" | "OFF" => InstallLocation::Disabled,
            "default" | "Default" => InstallLocation::Default,
            path => InstallLocation::Path(PathBuf::from(path)),
        };
        Ok(())
    }

    /// Record a user tarball override for a tool.
    ///
    /// Values containing a URL scheme stay remote; anything else becomes a
    /// local path, made absolute against the current directory.
    pub fn set_tarball_override(&mut self, name: &str, value: &str) -> Result<(), InstallError> {
        let tool = self.tool_mut(name).ok_or_else(|| InstallError::UnknownTool {
            name: name.to_string(),
        })?;
        tool.source = if value.contains("://") {
            SourceSpec::remote(value)
        } else {
            let path = PathBuf::from(value);
            let path = if path.is_absolute() {
                path
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(&path))
                    .unwrap_or(path)
            };
            SourceSpec::Local(path)
        };
        Ok(())
    }

    /// Run the templating passes, exactly once, after all overrides are in.
    ///
    /// Substitutes the install root into explicit path overrides, the tool
    /// version into remote URL templates, and expands artifact patterns per
    /// supported library extension.
    pub fn finalize(&mut self, prefix: &Path) -> Result<()> {
        self.finalize_with_extensions(prefix, &platform::lib_extensions())
    }

    fn finalize_with_extensions(&mut self, prefix: &Path, extensions: &[&str]) -> Result<()> {
        if self.finalized {
            bail!("catalog templating already applied");
        }

        let prefix_str = prefix.to_string_lossy();
        for tool in &mut self.tools {
            let templated_install = match &tool.install {
                InstallLocation::Path(path) => {
                    let raw = path.to_string_lossy();
                    raw.contains(PREFIX_PLACEHOLDER).then(|| {
                        InstallLocation::Path(PathBuf::from(
                            raw.replace(PREFIX_PLACEHOLDER, &prefix_str),
                        ))
                    })
                }
                _ => None,
            };
            if let Some(install) = templated_install {
                tool.install = install;
            }

            let templated_source = match &tool.source {
                SourceSpec::Remote { url, sha256 } if url.contains(VERSION_PLACEHOLDER) => {
                    Some(SourceSpec::Remote {
                        url: url.replace(VERSION_PLACEHOLDER, &tool.version),
                        sha256: sha256.clone(),
                    })
                }
                _ => None,
            };
            if let Some(source) = templated_source {
                tool.source = source;
            }

            let mut expanded = Vec::new();
            for pattern in &tool.artifacts {
                if pattern.contains(LIBEXT_PLACEHOLDER) {
                    for ext in extensions {
                        let name = pattern.replace(LIBEXT_PLACEHOLDER, ext);
                        if !expanded.contains(&name) {
                            expanded.push(name);
                        }
                    }
                } else if !expanded.contains(pattern) {
                    expanded.push(pattern.clone());
                }
            }
            tool.artifacts = expanded;
        }

        self.finalized = true;
        Ok(())
    }

    /// Rewrite a dependency name in both of a target's dependency lists.
    ///
    /// Used to replace a family alias with the chosen concrete member;
    /// idempotent once no occurrence of `from` remains.
    pub fn rewrite_dependency(&mut self, target: &str, from: &str, to: &str) {
        if let Some(tool) = self.tool_mut(target) {
            for dep in tool
                .mandatory_deps
                .iter_mut()
                .chain(tool.optional_deps.iter_mut())
            {
                if dep == from {
                    *dep = to.to_string();
                }
            }
        }
    }

    /// Remove a dependency name from both of a target's dependency lists.
    pub fn drop_dependency(&mut self, target: &str, name: &str) {
        if let Some(tool) = self.tool_mut(target) {
            tool.mandatory_deps.retain(|d| d != name);
            tool.optional_deps.retain(|d| d != name);
        }
    }

    /// Record the resolved install directory of a tool.
    pub fn set_install_path(&mut self, name: &str, path: PathBuf) {
        if let Some(tool) = self.tool_mut(name) {
            tool.install = InstallLocation::Path(path);
        }
    }

    /// Rewrite a tool's source to the downloaded local tarball.
    pub fn set_local_source(&mut self, name: &str, path: PathBuf) {
        if let Some(tool) = self.tool_mut(name) {
            tool.source = SourceSpec::Local(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finalized_builtin(prefix: &Path) -> Catalog {
        let mut catalog = Catalog::builtin();
        catalog
            .finalize_with_extensions(prefix, &["a", "so"])
            .unwrap();
        catalog
    }

    #[test]
    fn test_builtin_catalog_entries() {
        let catalog = Catalog::builtin();
        for name in [
            "hepmc", "boost", "pythia8", "lhapdf5", "lhapdf6", "zlib",
            "mg5amc_py8_interface", "ninja", "oneloop",
        ] {
            assert!(catalog.contains(name), "missing {name}");
        }
        assert!(catalog.family("lhapdf").is_some());
        // The alias never names a concrete entry.
        assert!(!catalog.contains("lhapdf"));
    }

    #[test]
    fn test_url_templating_contains_version() {
        let catalog = finalized_builtin(Path::new("/opt/tools"));
        let hepmc = catalog.tool("hepmc").unwrap();
        match &hepmc.source {
            SourceSpec::Remote { url, .. } => {
                assert!(url.contains("2.06.09"), "got {url}");
                assert!(!url.contains(VERSION_PLACEHOLDER));
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn test_prefix_templating_resolves_under_root() {
        let mut catalog = Catalog::builtin();
        catalog
            .set_location_override("zlib", "{prefix}/compression/zlib")
            .unwrap();
        catalog
            .finalize_with_extensions(Path::new("/opt/tools"), &["a", "so"])
            .unwrap();

        let path = catalog.tool("zlib").unwrap().install_path().unwrap();
        assert!(path.starts_with("/opt/tools"));
        assert_eq!(path, Path::new("/opt/tools/compression/zlib"));
    }

    #[test]
    fn test_artifact_expansion_and_dedup() {
        let catalog = finalized_builtin(Path::new("/opt/tools"));

        let zlib = catalog.tool("zlib").unwrap();
        assert_eq!(
            zlib.artifacts,
            vec![
                "libz.a",
                "libz.so",
                "libz.1.a",
                "libz.1.so",
                "libz.1.2.8.a",
                "libz.1.2.8.so"
            ]
        );

        // No placeholder, no expansion, no duplicates.
        let oneloop = catalog.tool("oneloop").unwrap();
        assert_eq!(oneloop.artifacts, vec!["libavh_olo.a"]);
    }

    #[test]
    fn test_finalize_is_single_shot() {
        let mut catalog = Catalog::builtin();
        catalog
            .finalize_with_extensions(Path::new("/opt/tools"), &["a", "so"])
            .unwrap();
        assert!(catalog
            .finalize_with_extensions(Path::new("/opt/tools"), &["a", "so"])
            .is_err());
    }

    #[test]
    fn test_location_override_off() {
        let mut catalog = Catalog::builtin();
        catalog.set_location_override("lhapdf6", "off").unwrap();
        assert!(catalog.tool("lhapdf6").unwrap().install.is_disabled());

        catalog.set_location_override("lhapdf6", "default").unwrap();
        assert!(catalog.tool("lhapdf6").unwrap().install.is_default());
    }

    #[test]
    fn test_location_override_unknown_tool() {
        let mut catalog = Catalog::builtin();
        let err = catalog.set_location_override("nosuch", "off").unwrap_err();
        assert!(matches!(err, InstallError::UnknownTool { .. }));
    }

    #[test]
    fn test_tarball_override_mode_inference() {
        let mut catalog = Catalog::builtin();

        catalog
            .set_tarball_override("zlib", "https://mirror.invalid/zlib.tar.gz")
            .unwrap();
        assert!(catalog.tool("zlib").unwrap().source.is_remote());

        catalog.set_tarball_override("zlib", "/srv/zlib.tar.gz").unwrap();
        assert_eq!(
            catalog.tool("zlib").unwrap().source.local_path(),
            Some(Path::new("/srv/zlib.tar.gz"))
        );
    }

    #[test]
    fn test_rewrite_and_drop_dependency() {
        let mut catalog = Catalog::builtin();
        catalog.rewrite_dependency("pythia8", "lhapdf", "lhapdf6");
        let pythia = catalog.tool("pythia8").unwrap();
        assert!(pythia.optional_deps.contains(&"lhapdf6".to_string()));
        assert!(!pythia.optional_deps.contains(&"lhapdf".to_string()));

        catalog.drop_dependency("pythia8", "lhapdf6");
        let pythia = catalog.tool("pythia8").unwrap();
        assert!(!pythia.optional_deps.contains(&"lhapdf6".to_string()));
    }
}
