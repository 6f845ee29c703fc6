//! Package-specific build steps.
//!
//! The orchestrator invokes exactly one `Builder` per tool to install;
//! whether the build actually succeeded is decided afterwards by the
//! verifier, from the expected artifacts. Builders only fail hard when
//! they cannot run at all.

pub mod interface;
pub mod ninja;
pub mod probe;
pub mod pythia;
pub mod registry;
pub mod script;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::{Catalog, Tool};
use crate::util::context::InstallContext;

pub use interface::InterfaceBuilder;
pub use ninja::NinjaBuilder;
pub use pythia::Pythia8Builder;
pub use registry::BuilderRegistry;
pub use script::ScriptBuilder;

/// A package-specific build step.
///
/// Output is captured into the tool's install log; resolved dependency
/// paths are read from the catalog entries the orchestrator filled in.
pub trait Builder {
    /// Run the build for `tool`.
    fn build(&self, tool: &Tool, catalog: &Catalog, ctx: &InstallContext) -> Result<()>;
}

/// Resolved install path of a dependency, failing if resolution never
/// recorded one.
pub(crate) fn dep_path<'a>(catalog: &'a Catalog, name: &str) -> Result<&'a Path> {
    catalog
        .tool(name)
        .and_then(|tool| tool.install_path())
        .with_context(|| format!("dependency `{name}` has no resolved install path"))
}

/// Local tarball of a tool, failing if the source was never acquired.
pub(crate) fn tarball_path(tool: &Tool) -> Result<&Path> {
    tool.source
        .local_path()
        .with_context(|| format!("`{}` has no local source tarball", tool.name))
}

/// Install path and log path of the tool being built.
pub(crate) fn build_paths(tool: &Tool) -> Result<(&Path, PathBuf)> {
    let install = tool
        .install_path()
        .with_context(|| format!("`{}` has no resolved install path", tool.name))?;
    let log = install.join(tool.log_file_name());
    Ok((install, log))
}
