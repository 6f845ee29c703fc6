//! Tarball extraction.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use tar::Archive;

/// Extract a gzip-compressed tarball into a directory.
pub fn extract_tar_gz(tarball: &Path, dest: &Path) -> Result<()> {
    let file = File::open(tarball)
        .with_context(|| format!("failed to open tarball: {}", tarball.display()))?;
    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);
    archive
        .unpack(dest)
        .with_context(|| format!("failed to extract {} into {}", tarball.display(), dest.display()))
}
