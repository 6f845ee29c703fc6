//! Tarball downloads.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use url::Url;

/// Fetches remote source material.
pub trait Downloader {
    /// Download `url` into `dest_dir`, returning the local file path.
    fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf>;
}

/// Blocking HTTP downloader.
#[derive(Debug, Default)]
pub struct HttpDownloader;

impl HttpDownloader {
    /// Create a new downloader.
    pub fn new() -> Self {
        HttpDownloader
    }
}

impl Downloader for HttpDownloader {
    fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        let parsed = Url::parse(url).with_context(|| format!("invalid source URL: {url}"))?;
        let file_name = file_name_from_url(&parsed);

        tracing::info!("fetching {}", url);
        let mut response = reqwest::blocking::get(url)
            .with_context(|| format!("failed to download tarball from {url}"))?;

        if !response.status().is_success() {
            bail!(
                "failed to download tarball from {}: HTTP {}",
                url,
                response.status()
            );
        }

        let dest = dest_dir.join(file_name);
        let mut file = File::create(&dest)
            .with_context(|| format!("failed to create {}", dest.display()))?;

        match response.content_length() {
            Some(len) => {
                let pb = ProgressBar::new(len);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
                        .expect("static template")
                        .progress_chars("#>-"),
                );
                let mut reader = pb.wrap_read(response);
                io::copy(&mut reader, &mut file)
                    .with_context(|| "failed to read tarball response body")?;
                pb.finish_and_clear();
            }
            None => {
                io::copy(&mut response, &mut file)
                    .with_context(|| "failed to read tarball response body")?;
            }
        }

        Ok(dest)
    }
}

/// Last URL path segment, with a fallback for schemes without one.
fn file_name_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.last().map(str::to_string))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "download.tar.gz".to_string())
}

/// Verify a downloaded tarball against an expected SHA-256 digest.
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let actual = hex::encode(hasher.finalize());

    if !actual.eq_ignore_ascii_case(expected) {
        bail!(
            "tarball hash mismatch for {}:\n  expected: {}\n  actual:   {}",
            path.display(),
            expected,
            actual
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_name_from_url() {
        let url = Url::parse("http://zlib.net/zlib-1.2.8.tar.gz").unwrap();
        assert_eq!(file_name_from_url(&url), "zlib-1.2.8.tar.gz");

        let url = Url::parse("http://example.invalid/").unwrap();
        assert_eq!(file_name_from_url(&url), "download.tar.gz");
    }

    #[test]
    fn test_verify_sha256() {
        let tmp = TempDir::new().unwrap();
        let tarball = tmp.path().join("demo.tar.gz");
        std::fs::write(&tarball, b"not really a tarball").unwrap();

        let mut hasher = Sha256::new();
        hasher.update(b"not really a tarball");
        let good = hex::encode(hasher.finalize());

        assert!(verify_sha256(&tarball, &good).is_ok());
        assert!(verify_sha256(&tarball, &good.to_uppercase()).is_ok());
        assert!(verify_sha256(&tarball, "deadbeef").is_err());
    }
}
