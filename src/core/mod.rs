//! Core data model: the catalog and its entry types.

pub mod catalog;
pub mod family;
pub mod platform;
pub mod tool;

pub use catalog::Catalog;
pub use family::Family;
pub use tool::{FoldRules, InstallLocation, SourceSpec, Tool, VersionProbe};
