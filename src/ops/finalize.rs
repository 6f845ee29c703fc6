//! Folding installed tools into the shared tree.
//!
//! Each tool's published artifacts are linked under `<prefix>/bin`,
//! `<prefix>/include`, and `<prefix>/lib` as relative symlinks. Entries
//! already present in the tree are left alone, whichever tool put them
//! there first.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::Tool;
use crate::util::fs as fsutil;

/// Shared-library suffixes excluded when a tool folds statically.
const SHARED_ARTIFACT_SUFFIXES: [&str; 3] = [".so", ".la", ".dylib"];

/// Link a tool's artifacts into the shared tree under `prefix`.
pub fn fold(tool: &Tool, prefix: &Path) -> Result<()> {
    let install = tool
        .install_path()
        .with_context(|| format!("`{}` has no resolved install path", tool.name))?;

    let groups = [
        (&tool.fold.bin, "bin"),
        (&tool.fold.include, "include"),
        (&tool.fold.lib, "lib"),
    ];

    for (patterns, dir_name) in groups {
        let tree_dir = prefix.join(dir_name);
        fsutil::ensure_dir(&tree_dir)?;

        let mut entries = fsutil::glob_paths(install, patterns)?;
        if dir_name == "lib" && tool.fold.static_only {
            entries.retain(|path| !is_shared_artifact(path));
        }

        for entry in entries {
            let Some(file_name) = entry.file_name() else {
                continue;
            };
            let link = tree_dir.join(file_name);
            // Skip entries already in the tree, including dangling links.
            if link.symlink_metadata().is_ok() {
                continue;
            }

            let target = relative_target(&entry, &tree_dir);
            fsutil::symlink(&target, &link).with_context(|| {
                format!(
                    "failed to link {} into {}",
                    entry.display(),
                    tree_dir.display()
                )
            })?;
        }
    }

    Ok(())
}

/// Relative link target from the tree directory to the artifact.
fn relative_target(entry: &Path, tree_dir: &Path) -> PathBuf {
    pathdiff::diff_paths(entry, tree_dir).unwrap_or_else(|| entry.to_path_buf())
}

fn is_shared_artifact(path: &Path) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    SHARED_ARTIFACT_SUFFIXES
        .iter()
        .any(|suffix| name.ends_with(suffix))
}
