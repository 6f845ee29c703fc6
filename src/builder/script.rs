//! Script-driven builds.
//!
//! Most tools install through a shell script shipped in the scripts
//! directory, invoked as `<script> [dep-paths...] <install-path> <version>
//! <tarball>` with all output captured into the install log.

use anyhow::Result;

use crate::builder::{build_paths, dep_path, tarball_path, Builder};
use crate::core::{Catalog, Tool};
use crate::util::context::InstallContext;
use crate::util::process::ProcessBuilder;

/// Builds a tool by running its install script.
#[derive(Debug, Clone)]
pub struct ScriptBuilder {
    script: String,
    /// Dependencies whose install paths are passed before the standard args.
    leading_deps: Vec<String>,
}

impl ScriptBuilder {
    /// Create a builder for the given script name.
    pub fn new(script: &str) -> Self {
        ScriptBuilder {
            script: script.to_string(),
            leading_deps: Vec::new(),
        }
    }

    /// Pass a dependency's install path ahead of the standard arguments.
    pub fn with_leading_dep(mut self, dep: &str) -> Self {
        self.leading_deps.push(dep.to_string());
        self
    }
}

impl Builder for ScriptBuilder {
    fn build(&self, tool: &Tool, catalog: &Catalog, ctx: &InstallContext) -> Result<()> {
        let (install, log) = build_paths(tool)?;

        let mut cmd = ProcessBuilder::new(ctx.scripts_dir().join(&self.script));
        for dep in &self.leading_deps {
            cmd = cmd.arg(dep_path(catalog, dep)?);
        }
        cmd = cmd.arg(install).arg(&tool.version).arg(tarball_path(tool)?);

        tracing::debug!("running {}", cmd.display_command());
        let status = cmd.exec_to_log(&log)?;
        if !status.success() {
            // The verifier decides; the log carries the details.
            tracing::warn!("install script for `{}` exited with {}", tool.name, status);
        }
        Ok(())
    }
}
