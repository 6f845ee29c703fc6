//! MG5aMC–Pythia 8 interface build step.
//!
//! The interface has no install script: its tarball is extracted straight
//! into the install directory and the bundled `compile.py` is run with the
//! resolved Pythia 8 path, plus the host MG5 path when one was given (only
//! recorded so the interface knows which distribution installed it).

use anyhow::Result;

use crate::builder::{build_paths, dep_path, tarball_path, Builder};
use crate::core::{Catalog, Tool};
use crate::sources::extract_tar_gz;
use crate::util::context::InstallContext;
use crate::util::process::ProcessBuilder;

/// Builds the MG5aMC–Pythia 8 interface.
#[derive(Debug, Default)]
pub struct InterfaceBuilder;

impl InterfaceBuilder {
    /// Create the builder.
    pub fn new() -> Self {
        InterfaceBuilder
    }
}

impl Builder for InterfaceBuilder {
    fn build(&self, tool: &Tool, catalog: &Catalog, ctx: &InstallContext) -> Result<()> {
        let (install, log) = build_paths(tool)?;

        extract_tar_gz(tarball_path(tool)?, install)?;

        let mut cmd =
            ProcessBuilder::new(install.join("compile.py")).arg(dep_path(catalog, "pythia8")?);
        if let Some(mg5) = ctx.mg5_path() {
            cmd = cmd.arg(mg5);
        }

        let status = cmd.exec_to_log(&log)?;
        if !status.success() {
            tracing::warn!("compile step for `{}` exited with {}", tool.name, status);
        }
        Ok(())
    }
}
