//! Pythia 8 build step.
//!
//! Pythia's install script takes the resolved HepMC and zlib paths plus a
//! string of configure options assembled from whichever optional
//! dependencies survived resolution, and from a probe of the HepMC
//! installation's named-weight support.

use anyhow::Result;

use crate::builder::{build_paths, dep_path, probe, tarball_path, Builder};
use crate::core::{Catalog, Tool};
use crate::util::context::InstallContext;
use crate::util::process::ProcessBuilder;

/// Builds Pythia 8.
#[derive(Debug, Default)]
pub struct Pythia8Builder;

impl Pythia8Builder {
    /// Create the builder.
    pub fn new() -> Self {
        Pythia8Builder
    }

    /// Configure options for the optional dependencies that survived
    /// resolution. The family alias has been rewritten to a concrete
    /// member by this point.
    fn optional_configure_args(tool: &Tool, catalog: &Catalog) -> Result<Vec<String>> {
        let mut options = Vec::new();
        for dep in &tool.optional_deps {
            match dep.as_str() {
                "lhapdf6" => {
                    options.push(format!(
                        "--with-lhapdf6={}",
                        dep_path(catalog, "lhapdf6")?.display()
                    ));
                    options.push("--with-lhapdf6-plugin=LHAPDF6.h".to_string());
                    options.push(format!(
                        "--with-boost={}",
                        dep_path(catalog, "boost")?.display()
                    ));
                }
                "lhapdf5" => {
                    options.push(format!(
                        "--with-lhapdf5={}",
                        dep_path(catalog, "lhapdf5")?.display()
                    ));
                }
                _ => {}
            }
        }
        Ok(options)
    }
}

impl Builder for Pythia8Builder {
    fn build(&self, tool: &Tool, catalog: &Catalog, ctx: &InstallContext) -> Result<()> {
        let (install, log) = build_paths(tool)?;
        let mut options = Self::optional_configure_args(tool, catalog)?;

        let hepmc = dep_path(catalog, "hepmc")?;
        if probe::hepmc_supports_named_weights(ctx.cpp_compiler(), ctx.scripts_dir(), hepmc) {
            options.push("--with-hepmc2hack".to_string());
            tracing::info!(
                "HepMC at {} supports the writing of named weights",
                hepmc.display()
            );
        } else {
            tracing::warn!(
                "HepMC at {} does not support named weights; a separate event file \
                 will be written per systematics weight",
                hepmc.display()
            );
        }

        let status = ProcessBuilder::new(ctx.scripts_dir().join("install-pythia8.sh"))
            .arg(install)
            .arg(tarball_path(tool)?)
            .arg(hepmc)
            .arg(dep_path(catalog, "zlib")?)
            .arg(options.join(" "))
            .exec_to_log(&log)?;
        if !status.success() {
            tracing::warn!("install script for `{}` exited with {}", tool.name, status);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InstallLocation, SourceSpec};
    use std::path::PathBuf;

    fn resolved(name: &str, path: &str) -> Tool {
        let mut tool = Tool::new(name, "1.0", SourceSpec::remote("http://x.invalid/t.tar.gz"));
        tool.install = InstallLocation::Path(PathBuf::from(path));
        tool
    }

    #[test]
    fn test_configure_args_for_lhapdf6() {
        let mut catalog = Catalog::new();
        catalog.insert(resolved("lhapdf6", "/opt/tools/lhapdf6"));
        catalog.insert(resolved("boost", "/opt/tools/boost"));

        let pythia = Tool::new("pythia8", "82151", SourceSpec::remote("http://x.invalid/p.tar.gz"))
            .with_optional_deps(&["lhapdf6"]);

        let args = Pythia8Builder::optional_configure_args(&pythia, &catalog).unwrap();
        assert_eq!(
            args,
            vec![
                "--with-lhapdf6=/opt/tools/lhapdf6",
                "--with-lhapdf6-plugin=LHAPDF6.h",
                "--with-boost=/opt/tools/boost",
            ]
        );
    }

    #[test]
    fn test_configure_args_for_lhapdf5() {
        let mut catalog = Catalog::new();
        catalog.insert(resolved("lhapdf5", "/opt/tools/lhapdf5"));

        let pythia = Tool::new("pythia8", "82151", SourceSpec::remote("http://x.invalid/p.tar.gz"))
            .with_optional_deps(&["lhapdf5"]);

        let args = Pythia8Builder::optional_configure_args(&pythia, &catalog).unwrap();
        assert_eq!(args, vec!["--with-lhapdf5=/opt/tools/lhapdf5"]);
    }

    #[test]
    fn test_no_optional_deps_no_args() {
        let catalog = Catalog::new();
        let pythia = Tool::new("pythia8", "82151", SourceSpec::remote("http://x.invalid/p.tar.gz"));

        let args = Pythia8Builder::optional_configure_args(&pythia, &catalog).unwrap();
        assert!(args.is_empty());
    }
}
