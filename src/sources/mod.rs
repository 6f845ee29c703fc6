//! Source acquisition: tarball downloads and extraction.

pub mod archive;
pub mod download;

pub use archive::extract_tar_gz;
pub use download::{verify_sha256, Downloader, HttpDownloader};
