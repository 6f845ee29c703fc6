//! Configuration file support.
//!
//! A TOML file can pre-set anything the command line accepts; flags given
//! on the command line take precedence. The default location is the user
//! configuration directory; `--config` points anywhere else.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::core::Catalog;
use crate::error::InstallError;
use crate::util::context::InstallContext;

/// Project directories for hepstack.
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("org", "hepstack", "hepstack"));

/// Per-tool overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolOverride {
    /// Install location: a path (may contain `{prefix}`), `default`, or `off`.
    pub install_path: Option<String>,

    /// Tarball source: a local path or an URL.
    pub tarball: Option<String>,
}

/// User configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Install root.
    pub prefix: Option<PathBuf>,

    /// Install scripts directory.
    pub scripts_dir: Option<PathBuf>,

    /// C++ compiler.
    pub cpp_compiler: Option<String>,

    /// Fortran compiler.
    pub fortran_compiler: Option<String>,

    /// C++ standard library flag.
    pub cpp_standard_lib: Option<String>,

    /// Host MG5 distribution path.
    pub mg5_path: Option<PathBuf>,

    /// Per-tool overrides, keyed by tool name.
    pub tools: HashMap<String, ToolOverride>,
}

impl UserConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Default configuration file location.
    pub fn default_path() -> Option<PathBuf> {
        PROJECT_DIRS
            .as_ref()
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply this configuration to a catalog and context.
    ///
    /// Call before command-line overrides so the flags win.
    pub fn apply(&self, catalog: &mut Catalog, ctx: &mut InstallContext) -> Result<(), InstallError> {
        if let Some(compiler) = &self.cpp_compiler {
            ctx.set_cpp_compiler(compiler);
        }
        if let Some(compiler) = &self.fortran_compiler {
            ctx.set_fortran_compiler(compiler);
        }
        if let Some(stdlib) = &self.cpp_standard_lib {
            ctx.set_cpp_standard_lib(stdlib)?;
        }
        if let Some(path) = &self.mg5_path {
            ctx.set_mg5_path(path.clone());
        }

        for (name, tool_override) in &self.tools {
            if let Some(location) = &tool_override.install_path {
                catalog.set_location_override(name, location)?;
            }
            if let Some(tarball) = &tool_override.tarball {
                catalog.set_tarball_override(name, tarball)?;
            }
        }

        Ok(())
    }
}
