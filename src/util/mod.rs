//! Shared utilities

pub mod config;
pub mod context;
pub mod env;
pub mod fs;
pub mod process;
pub mod workdir;

pub use config::UserConfig;
pub use context::InstallContext;
pub use env::EnvGuard;
pub use process::ProcessBuilder;
pub use workdir::ScopedWorkdir;
