//! Ninja (one-loop integral reduction library) build step.
//!
//! Probes which optimization flags the configured C++ compiler accepts and
//! forwards the accepted set, the OneLOop path, and the configured C++
//! standard library to the install script.

use anyhow::Result;

use crate::builder::{build_paths, dep_path, probe, tarball_path, Builder};
use crate::core::{Catalog, Tool};
use crate::util::context::InstallContext;
use crate::util::process::ProcessBuilder;

/// Flags worth having when the compiler accepts them.
const CANDIDATE_FLAGS: [&str; 3] = ["-fcx-fortran-rules", "-fno-exceptions", "-fno-rtti"];

/// Builds Ninja.
#[derive(Debug, Default)]
pub struct NinjaBuilder;

impl NinjaBuilder {
    /// Create the builder.
    pub fn new() -> Self {
        NinjaBuilder
    }

    fn cxx_flags(cpp: &str) -> Vec<&'static str> {
        let mut flags = vec!["-O2"];
        for flag in CANDIDATE_FLAGS {
            if probe::cpp_supports_flags(cpp, &[flag]) {
                flags.push(flag);
            }
        }
        flags
    }
}

impl Builder for NinjaBuilder {
    fn build(&self, tool: &Tool, catalog: &Catalog, ctx: &InstallContext) -> Result<()> {
        let (install, log) = build_paths(tool)?;
        let flags = Self::cxx_flags(ctx.cpp_compiler());

        let status = ProcessBuilder::new(ctx.scripts_dir().join("install-ninja.sh"))
            .arg(install)
            .arg(tarball_path(tool)?)
            .arg(dep_path(catalog, "oneloop")?)
            .arg(flags.join(" "))
            .arg(ctx.cpp_standard_lib())
            .exec_to_log(&log)?;
        if !status.success() {
            tracing::warn!("install script for `{}` exited with {}", tool.name, status);
        }
        Ok(())
    }
}
