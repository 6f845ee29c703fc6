//! High-level operations.
//!
//! This module contains the install orchestration: the recursive driver,
//! post-install verification, and folding into the shared tree.

pub mod finalize;
pub mod install;
pub mod verify;

pub use finalize::fold;
pub use install::Installer;
pub use verify::check_successful_installation;
