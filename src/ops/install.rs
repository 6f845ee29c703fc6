//! Recursive installation driver.
//!
//! `Installer` walks a tool's dependency edges, decides per edge whether to
//! reuse, install, or drop, recurses into missing dependencies before the
//! tool's own build step, and verifies and folds every finished dependency
//! so later siblings can find it. Any fatal condition unwinds the whole
//! run; already-completed sibling installs stay on disk.

use anyhow::anyhow;

use crate::builder::BuilderRegistry;
use crate::core::{Catalog, InstallLocation, SourceSpec};
use crate::error::InstallError;
use crate::ops::{finalize, verify};
use crate::resolver::{classify, resolve_family, FamilyChoice, LibrarySearch, Resolution};
use crate::sources::{verify_sha256, Downloader};
use crate::util::context::InstallContext;
use crate::util::env::EnvGuard;
use crate::util::fs as fsutil;
use crate::util::workdir::ScopedWorkdir;

/// Resolution context for one top-level install invocation.
pub struct Installer<'a> {
    catalog: &'a mut Catalog,
    ctx: &'a InstallContext,
    builders: &'a BuilderRegistry,
    downloader: &'a dyn Downloader,
    search: &'a dyn LibrarySearch,
}

impl<'a> Installer<'a> {
    /// Create an installer over a finalized catalog.
    pub fn new(
        catalog: &'a mut Catalog,
        ctx: &'a InstallContext,
        builders: &'a BuilderRegistry,
        downloader: &'a dyn Downloader,
        search: &'a dyn LibrarySearch,
    ) -> Self {
        Installer {
            catalog,
            ctx,
            builders,
            downloader,
            search,
        }
    }

    /// Install `target` and every dependency it needs, then verify and
    /// fold the target itself.
    ///
    /// `CXX` and `FC` are overridden for the duration of the call and
    /// restored afterwards regardless of outcome.
    pub fn install(&mut self, target: &str) -> Result<(), InstallError> {
        self.catalog.expect_tool(target)?;
        self.check_existing(target)?;

        let _env = EnvGuard::set(&[
            ("CXX", self.ctx.cpp_compiler()),
            ("FC", self.ctx.fortran_compiler()),
        ]);
        self.install_with_dependencies(target, true)?;

        let tool = self.catalog.expect_tool(target)?.clone();
        if !verify::check_successful_installation(&tool) {
            return Err(InstallError::BuildFailure {
                tool: target.to_string(),
                log: tool.install_log(),
            });
        }

        finalize::fold(&tool, self.ctx.prefix())?;
        tracing::info!(
            "successful installation of `{}` in `{}`",
            target,
            self.ctx.prefix().display()
        );
        Ok(())
    }

    /// Refuse to clobber an existing installation of the target.
    ///
    /// A directory holding nothing but a leftover install log is removed
    /// silently; anything else needs `--force`.
    fn check_existing(&mut self, target: &str) -> Result<(), InstallError> {
        let log_name = self.catalog.expect_tool(target)?.log_file_name();
        let dir = self.ctx.default_install_path(target);
        if !dir.is_dir() {
            return Ok(());
        }

        if fsutil::is_effectively_empty(&dir, &log_name)? {
            fsutil::remove_dir_all_if_exists(&dir)?;
        } else if self.ctx.force() {
            tracing::info!(
                "removing existing installation of `{}` in `{}`",
                target,
                self.ctx.prefix().display()
            );
            fsutil::remove_dir_all_if_exists(&dir)?;
        } else {
            return Err(InstallError::ExistingInstallation {
                tool: target.to_string(),
                path: dir,
            });
        }
        Ok(())
    }

    fn install_with_dependencies(
        &mut self,
        target: &str,
        is_top_level: bool,
    ) -> Result<(), InstallError> {
        // The target is now being installed, not merely depended upon:
        // concretize a still-default install path.
        {
            let tool = self
                .catalog
                .tool_mut(target)
                .ok_or_else(|| InstallError::UnknownTool {
                    name: target.to_string(),
                })?;
            if tool.install.is_default() {
                tool.install =
                    InstallLocation::Path(self.ctx.default_install_path(target));
            }
        }

        // Mandatory edges first; the snapshot tolerates list edits below.
        let deps: Vec<String> = {
            let tool = self.catalog.expect_tool(target)?;
            tool.mandatory_deps
                .iter()
                .chain(tool.optional_deps.iter())
                .cloned()
                .collect()
        };

        for dep in deps {
            let (name, resolution) = if let Some(family) = self.catalog.family(&dep).cloned() {
                match resolve_family(self.catalog, &family, self.ctx.prefix(), self.search)? {
                    FamilyChoice::Dropped => {
                        tracing::warn!(
                            "`{}` dependency `{}` is disabled and will not be available",
                            target,
                            dep
                        );
                        self.catalog.drop_dependency(target, &dep);
                        continue;
                    }
                    FamilyChoice::Selected { name, resolution } => {
                        self.catalog.rewrite_dependency(target, &dep, &name);
                        (name, resolution)
                    }
                }
            } else {
                let resolution = classify(self.catalog, &dep, self.ctx.prefix(), self.search)?;
                (dep, resolution)
            };

            match resolution {
                Resolution::Disabled => {
                    let is_optional = self
                        .catalog
                        .expect_tool(target)?
                        .optional_deps
                        .iter()
                        .any(|d| d == &name);
                    if is_optional {
                        tracing::warn!(
                            "optional `{}` dependency `{}` is disabled and will not be available",
                            target,
                            name
                        );
                        self.catalog.drop_dependency(target, &name);
                    } else {
                        return Err(InstallError::MandatoryDependencyDisabled {
                            tool: target.to_string(),
                            dependency: name,
                        });
                    }
                }
                Resolution::MustInstall => {
                    tracing::info!(
                        "detected missing `{}` dependency `{}`, installing it now",
                        target,
                        name
                    );
                    self.install_with_dependencies(&name, false)?;
                }
                Resolution::Satisfied(path) => {
                    tracing::info!(
                        "`{}` dependency `{}` found at {}",
                        target,
                        name,
                        path.display()
                    );
                    self.catalog.set_install_path(&name, path);
                }
            }
        }

        // Source acquisition and build run against a scoped working
        // directory, removed on every exit path.
        let workdir = ScopedWorkdir::new()?;

        let source = self.catalog.expect_tool(target)?.source.clone();
        if let SourceSpec::Remote { url, sha256 } = source {
            tracing::info!("downloading `{}` sources...", target);
            let tarball = self
                .downloader
                .fetch(&url, workdir.path())
                .map_err(|e| InstallError::DownloadFailure {
                    url: url.clone(),
                    source: e,
                })?;
            if let Some(expected) = sha256 {
                verify_sha256(&tarball, &expected).map_err(|e| InstallError::DownloadFailure {
                    url: url.clone(),
                    source: e,
                })?;
            }
            self.catalog.set_local_source(target, tarball);
        }

        let tool = self.catalog.expect_tool(target)?.clone();
        let install_path = tool
            .install_path()
            .ok_or_else(|| anyhow!("`{target}` has no resolved install path"))?;
        fsutil::ensure_dir(install_path)?;

        tracing::info!("installing tool `{}`...", target);
        if let Some(log) = tool.install_log() {
            tracing::info!("follow the progress with: tail -f {}", log.display());
        }

        let builder = self
            .builders
            .get(target)
            .ok_or_else(|| anyhow!("no builder registered for `{target}`"))?;
        builder.build(&tool, self.catalog, self.ctx)?;

        // A finished dependency is verified and folded immediately so
        // later siblings and the top-level build can find it.
        if !is_top_level {
            let tool = self.catalog.expect_tool(target)?.clone();
            if !verify::check_successful_installation(&tool) {
                return Err(InstallError::BuildFailure {
                    tool: target.to_string(),
                    log: tool.install_log(),
                });
            }
            finalize::fold(&tool, self.ctx.prefix())?;
            tracing::info!(
                "successful installation of dependency `{}` in `{}`",
                target,
                self.ctx.prefix().display()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::core::{Family, InstallLocation, Tool};
    use crate::test_support::StaticSearch;
    use anyhow::Result as AnyResult;
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Builder that records invocation order and fabricates artifacts.
    struct FakeBuilder {
        order: Rc<RefCell<Vec<String>>>,
        produce: bool,
    }

    impl Builder for FakeBuilder {
        fn build(&self, tool: &Tool, _catalog: &Catalog, _ctx: &InstallContext) -> AnyResult<()> {
            self.order.borrow_mut().push(tool.name.clone());
            if self.produce {
                let lib = tool.install_path().unwrap().join("lib");
                std::fs::create_dir_all(&lib)?;
                std::fs::write(lib.join(format!("lib{}.a", tool.name)), "")?;
            }
            Ok(())
        }
    }

    struct UnusedDownloader;

    impl Downloader for UnusedDownloader {
        fn fetch(&self, url: &str, _dest_dir: &Path) -> AnyResult<PathBuf> {
            panic!("unexpected download of {url}");
        }
    }

    /// Downloader that writes a placeholder tarball.
    struct FakeDownloader {
        fetched: Rc<RefCell<Vec<String>>>,
    }

    impl Downloader for FakeDownloader {
        fn fetch(&self, url: &str, dest_dir: &Path) -> AnyResult<PathBuf> {
            self.fetched.borrow_mut().push(url.to_string());
            let dest = dest_dir.join("src.tar.gz");
            std::fs::write(&dest, "")?;
            Ok(dest)
        }
    }

    fn local_tool(name: &str, tmp: &Path) -> Tool {
        let tarball = tmp.join(format!("{name}.tar.gz"));
        std::fs::write(&tarball, "").unwrap();
        let artifact = format!("lib{name}.a");
        Tool::new(name, "1.0", SourceSpec::Local(tarball)).with_artifacts(&[artifact.as_str()])
    }

    fn registry_for(names: &[&str], order: &Rc<RefCell<Vec<String>>>, produce: bool) -> BuilderRegistry {
        let mut registry = BuilderRegistry::new();
        for name in names {
            registry.register(
                name,
                Box::new(FakeBuilder {
                    order: Rc::clone(order),
                    produce,
                }),
            );
        }
        registry
    }

    #[test]
    fn test_recurses_into_missing_dependency_first() {
        let tmp = TempDir::new().unwrap();
        let prefix = tmp.path().join("tools");

        let mut catalog = Catalog::new();
        catalog.insert(local_tool("alpha", tmp.path()).with_mandatory_deps(&["beta"]));
        catalog.insert(local_tool("beta", tmp.path()));

        let order = Rc::new(RefCell::new(Vec::new()));
        let registry = registry_for(&["alpha", "beta"], &order, true);
        let ctx = InstallContext::new(prefix.clone(), tmp.path().to_path_buf());

        let search = StaticSearch::empty();
        let mut installer = Installer::new(
            &mut catalog,
            &ctx,
            &registry,
            &UnusedDownloader,
            &search,
        );
        installer.install("alpha").unwrap();

        // The dependency builds before the target.
        assert_eq!(*order.borrow(), vec!["beta".to_string(), "alpha".to_string()]);

        // Beta's resolved path was recorded for the alpha build to use.
        assert_eq!(
            catalog.tool("beta").unwrap().install_path(),
            Some(prefix.join("beta").as_path())
        );

        // Both ended up folded into the shared tree.
        assert!(prefix.join("lib/libbeta.a").exists());
        assert!(prefix.join("lib/libalpha.a").exists());
    }

    #[test]
    fn test_disabled_mandatory_dependency_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let prefix = tmp.path().join("tools");

        let mut catalog = Catalog::new();
        catalog.insert(local_tool("alpha", tmp.path()).with_mandatory_deps(&["gamma"]));
        let mut gamma = local_tool("gamma", tmp.path());
        gamma.install = InstallLocation::Disabled;
        catalog.insert(gamma);

        let order = Rc::new(RefCell::new(Vec::new()));
        let registry = registry_for(&["alpha", "gamma"], &order, true);
        let ctx = InstallContext::new(prefix, tmp.path().to_path_buf());

        let search = StaticSearch::empty();
        let mut installer = Installer::new(
            &mut catalog,
            &ctx,
            &registry,
            &UnusedDownloader,
            &search,
        );
        let err = installer.install("alpha").unwrap_err();

        assert!(matches!(
            err,
            InstallError::MandatoryDependencyDisabled { .. }
        ));
        // The run aborted before any builder was invoked.
        assert!(order.borrow().is_empty());
    }

    #[test]
    fn test_disabled_optional_dependency_is_dropped() {
        let tmp = TempDir::new().unwrap();
        let prefix = tmp.path().join("tools");

        let mut catalog = Catalog::new();
        catalog.insert(local_tool("alpha", tmp.path()).with_optional_deps(&["gamma"]));
        let mut gamma = local_tool("gamma", tmp.path());
        gamma.install = InstallLocation::Disabled;
        catalog.insert(gamma);

        let order = Rc::new(RefCell::new(Vec::new()));
        let registry = registry_for(&["alpha"], &order, true);
        let ctx = InstallContext::new(prefix, tmp.path().to_path_buf());

        let search = StaticSearch::empty();
        let mut installer = Installer::new(
            &mut catalog,
            &ctx,
            &registry,
            &UnusedDownloader,
            &search,
        );
        installer.install("alpha").unwrap();

        assert_eq!(*order.borrow(), vec!["alpha".to_string()]);
        assert!(catalog.tool("alpha").unwrap().optional_deps.is_empty());
    }

    #[test]
    fn test_satisfied_dependency_is_not_rebuilt() {
        let tmp = TempDir::new().unwrap();
        let prefix = tmp.path().join("tools");

        let mut catalog = Catalog::new();
        catalog.insert(local_tool("alpha", tmp.path()).with_mandatory_deps(&["beta"]));
        catalog.insert(local_tool("beta", tmp.path()));

        let order = Rc::new(RefCell::new(Vec::new()));
        let registry = registry_for(&["alpha", "beta"], &order, true);
        let ctx = InstallContext::new(prefix, tmp.path().to_path_buf());

        // Beta is already present on a search path.
        let search = StaticSearch::with_hit("beta", &PathBuf::from("/usr/local/lib/libbeta.a"));
        let mut installer = Installer::new(
            &mut catalog,
            &ctx,
            &registry,
            &UnusedDownloader,
            &search,
        );
        installer.install("alpha").unwrap();

        assert_eq!(*order.borrow(), vec!["alpha".to_string()]);
        assert_eq!(
            catalog.tool("beta").unwrap().install_path(),
            Some(Path::new("/usr/local"))
        );
    }

    #[test]
    fn test_failed_dependency_aborts_run() {
        let tmp = TempDir::new().unwrap();
        let prefix = tmp.path().join("tools");

        let mut catalog = Catalog::new();
        catalog.insert(local_tool("alpha", tmp.path()).with_mandatory_deps(&["beta"]));
        catalog.insert(local_tool("beta", tmp.path()));

        let order = Rc::new(RefCell::new(Vec::new()));
        // Builders produce nothing: dependency verification must fail.
        let registry = registry_for(&["alpha", "beta"], &order, false);
        let ctx = InstallContext::new(prefix, tmp.path().to_path_buf());

        let search = StaticSearch::empty();
        let mut installer = Installer::new(
            &mut catalog,
            &ctx,
            &registry,
            &UnusedDownloader,
            &search,
        );
        let err = installer.install("alpha").unwrap_err();

        assert!(matches!(err, InstallError::BuildFailure { ref tool, .. } if tool == "beta"));
        // Alpha's own build never ran.
        assert_eq!(*order.borrow(), vec!["beta".to_string()]);
    }

    #[test]
    fn test_remote_source_downloaded_and_rewritten() {
        let tmp = TempDir::new().unwrap();
        let prefix = tmp.path().join("tools");

        let mut catalog = Catalog::new();
        catalog.insert(
            Tool::new("alpha", "1.0", SourceSpec::remote("http://x.invalid/alpha-1.0.tar.gz"))
                .with_artifacts(&["libalpha.a"]),
        );

        let order = Rc::new(RefCell::new(Vec::new()));
        let registry = registry_for(&["alpha"], &order, true);
        let ctx = InstallContext::new(prefix, tmp.path().to_path_buf());

        let fetched = Rc::new(RefCell::new(Vec::new()));
        let downloader = FakeDownloader {
            fetched: Rc::clone(&fetched),
        };
        let search = StaticSearch::empty();
        let mut installer = Installer::new(
            &mut catalog,
            &ctx,
            &registry,
            &downloader,
            &search,
        );
        installer.install("alpha").unwrap();

        assert_eq!(*fetched.borrow(), vec!["http://x.invalid/alpha-1.0.tar.gz"]);
        // The source descriptor now points at the downloaded tarball.
        assert!(!catalog.tool("alpha").unwrap().source.is_remote());
    }

    #[test]
    fn test_checksum_mismatch_is_a_download_failure() {
        let tmp = TempDir::new().unwrap();
        let prefix = tmp.path().join("tools");

        let mut catalog = Catalog::new();
        catalog.insert(
            Tool::new(
                "alpha",
                "1.0",
                SourceSpec::Remote {
                    url: "http://x.invalid/alpha-1.0.tar.gz".to_string(),
                    sha256: Some("deadbeef".to_string()),
                },
            )
            .with_artifacts(&["libalpha.a"]),
        );

        let order = Rc::new(RefCell::new(Vec::new()));
        let registry = registry_for(&["alpha"], &order, true);
        let ctx = InstallContext::new(prefix, tmp.path().to_path_buf());

        let downloader = FakeDownloader {
            fetched: Rc::new(RefCell::new(Vec::new())),
        };
        let search = StaticSearch::empty();
        let mut installer = Installer::new(
            &mut catalog,
            &ctx,
            &registry,
            &downloader,
            &search,
        );
        let err = installer.install("alpha").unwrap_err();

        assert!(matches!(err, InstallError::DownloadFailure { .. }));
        assert!(order.borrow().is_empty());
    }

    #[test]
    fn test_family_alias_rewritten_to_concrete_member() {
        let tmp = TempDir::new().unwrap();
        let prefix = tmp.path().join("tools");

        let mut catalog = Catalog::new();
        catalog.insert(local_tool("alpha", tmp.path()).with_optional_deps(&["pdf"]));
        catalog.insert(local_tool("pdf5", tmp.path()));
        catalog.insert(local_tool("pdf6", tmp.path()));
        catalog.add_family(Family::new("pdf", ["pdf5", "pdf6"], "pdf6"));

        let order = Rc::new(RefCell::new(Vec::new()));
        let registry = registry_for(&["alpha", "pdf5", "pdf6"], &order, true);
        let ctx = InstallContext::new(prefix, tmp.path().to_path_buf());

        let search = StaticSearch::empty();
        let mut installer = Installer::new(
            &mut catalog,
            &ctx,
            &registry,
            &UnusedDownloader,
            &search,
        );
        installer.install("alpha").unwrap();

        // Both members missing: the preferred one was installed.
        assert_eq!(*order.borrow(), vec!["pdf6".to_string(), "alpha".to_string()]);
        assert_eq!(
            catalog.tool("alpha").unwrap().optional_deps,
            vec!["pdf6".to_string()]
        );
    }

    #[test]
    fn test_existing_installation_without_force() {
        let tmp = TempDir::new().unwrap();
        let prefix = tmp.path().join("tools");

        let mut catalog = Catalog::new();
        catalog.insert(local_tool("alpha", tmp.path()));

        // Something real is already installed there.
        std::fs::create_dir_all(prefix.join("alpha/lib")).unwrap();
        std::fs::write(prefix.join("alpha/lib/libalpha.a"), "").unwrap();

        let order = Rc::new(RefCell::new(Vec::new()));
        let registry = registry_for(&["alpha"], &order, true);
        let ctx = InstallContext::new(prefix.clone(), tmp.path().to_path_buf());

        let search = StaticSearch::empty();
        let mut installer = Installer::new(
            &mut catalog,
            &ctx,
            &registry,
            &UnusedDownloader,
            &search,
        );
        let err = installer.install("alpha").unwrap_err();
        assert!(matches!(err, InstallError::ExistingInstallation { .. }));
        assert!(order.borrow().is_empty());
    }

    #[test]
    fn test_existing_installation_with_force() {
        let tmp = TempDir::new().unwrap();
        let prefix = tmp.path().join("tools");

        let mut catalog = Catalog::new();
        catalog.insert(local_tool("alpha", tmp.path()));

        std::fs::create_dir_all(prefix.join("alpha/lib")).unwrap();
        std::fs::write(prefix.join("alpha/lib/stale.txt"), "").unwrap();

        let order = Rc::new(RefCell::new(Vec::new()));
        let registry = registry_for(&["alpha"], &order, true);
        let mut ctx = InstallContext::new(prefix.clone(), tmp.path().to_path_buf());
        ctx.set_force(true);

        let search = StaticSearch::empty();
        let mut installer = Installer::new(
            &mut catalog,
            &ctx,
            &registry,
            &UnusedDownloader,
            &search,
        );
        installer.install("alpha").unwrap();

        assert_eq!(*order.borrow(), vec!["alpha".to_string()]);
        assert!(!prefix.join("alpha/lib/stale.txt").exists());
    }

    #[test]
    fn test_unknown_target() {
        let tmp = TempDir::new().unwrap();
        let mut catalog = Catalog::new();
        let registry = BuilderRegistry::new();
        let ctx = InstallContext::new(tmp.path().to_path_buf(), tmp.path().to_path_buf());

        let search = StaticSearch::empty();
        let mut installer = Installer::new(
            &mut catalog,
            &ctx,
            &registry,
            &UnusedDownloader,
            &search,
        );
        let err = installer.install("nosuch").unwrap_err();
        assert!(matches!(err, InstallError::UnknownTool { .. }));
    }
}
