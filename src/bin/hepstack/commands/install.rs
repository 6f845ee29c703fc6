//! `hepstack install` command
//!
//! Assembles the catalog and context from built-in defaults, the
//! configuration file, and command-line flags (in that precedence order),
//! then hands over to the installer.

use std::path::PathBuf;

use hepstack::builder::BuilderRegistry;
use hepstack::core::Catalog;
use hepstack::error::InstallError;
use hepstack::ops::Installer;
use hepstack::resolver::SystemSearch;
use hepstack::sources::HttpDownloader;
use hepstack::util::config::UserConfig;
use hepstack::util::context::InstallContext;
use hepstack::util::fs as fsutil;
use hepstack::util::process;

use crate::cli::InstallArgs;

pub fn execute(args: InstallArgs) -> Result<(), InstallError> {
    // Config file first so command-line flags win.
    let config = match &args.config {
        Some(path) => UserConfig::load(path)?,
        None => UserConfig::default_path()
            .map(|path| UserConfig::load_or_default(&path))
            .unwrap_or_default(),
    };

    let prefix = absolutize(
        args.prefix
            .clone()
            .or_else(|| config.prefix.clone())
            .unwrap_or_else(default_prefix),
    )?;
    let scripts_dir = absolutize(
        args.scripts_dir
            .clone()
            .or_else(|| config.scripts_dir.clone())
            .unwrap_or_else(default_scripts_dir),
    )?;

    let mut catalog = Catalog::builtin();
    let mut ctx = InstallContext::new(prefix.clone(), scripts_dir);
    config.apply(&mut catalog, &mut ctx)?;

    if let Some(compiler) = &args.cpp_compiler {
        ctx.set_cpp_compiler(compiler);
    }
    if let Some(compiler) = &args.fortran_compiler {
        ctx.set_fortran_compiler(compiler);
    }
    if let Some(stdlib) = &args.cpp_standard_lib {
        ctx.set_cpp_standard_lib(stdlib)?;
    }
    if let Some(path) = &args.mg5_path {
        ctx.set_mg5_path(path.clone());
    }
    ctx.set_force(args.force);

    for value in &args.with_overrides {
        let (tool, mode) = split_override("--with", value)?;
        catalog.set_location_override(tool, mode)?;
    }
    for value in &args.tarball_overrides {
        let (tool, source) = split_override("--tarball", value)?;
        catalog.set_tarball_override(tool, source)?;
    }

    for (language, compiler) in [("C++", ctx.cpp_compiler()), ("Fortran", ctx.fortran_compiler())]
    {
        if process::find_executable(compiler).is_none() {
            tracing::warn!("{language} compiler `{compiler}` not found on PATH");
        }
    }

    fsutil::ensure_dir(&prefix)?;
    catalog.finalize(&prefix)?;

    let registry = BuilderRegistry::builtin();
    let downloader = HttpDownloader::new();
    let search = SystemSearch::from_env();

    let mut installer = Installer::new(&mut catalog, &ctx, &registry, &downloader, &search);
    installer.install(&args.tool)
}

/// Split a `TOOL=VALUE` override.
fn split_override<'a>(option: &str, value: &'a str) -> Result<(&'a str, &'a str), InstallError> {
    value
        .split_once('=')
        .ok_or_else(|| InstallError::UnsupportedOption {
            option: option.to_string(),
            value: value.to_string(),
        })
}

fn absolutize(path: PathBuf) -> Result<PathBuf, InstallError> {
    if path.is_absolute() {
        Ok(path)
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| InstallError::Other(anyhow::anyhow!("failed to get current directory: {e}")))?;
        Ok(cwd.join(path))
    }
}

fn default_prefix() -> PathBuf {
    PathBuf::from("HEPTools")
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from("installers")
}
