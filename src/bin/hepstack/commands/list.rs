//! `hepstack list` command

use hepstack::core::Catalog;
use hepstack::error::InstallError;

use crate::cli::ListArgs;

pub fn execute(_args: ListArgs) -> Result<(), InstallError> {
    let catalog = Catalog::builtin();

    for tool in catalog.tools() {
        let mut notes = Vec::new();
        if !tool.mandatory_deps.is_empty() {
            notes.push(format!("needs {}", tool.mandatory_deps.join(", ")));
        }
        if !tool.optional_deps.is_empty() {
            notes.push(format!("optional {}", tool.optional_deps.join(", ")));
        }
        println!("{:<22} {:<10} {}", tool.name, tool.version, notes.join("; "));
    }

    for family in catalog.families() {
        println!(
            "{:<22} one of {} (default {})",
            family.alias,
            family.members.join(" | "),
            family.preferred
        );
    }

    Ok(())
}
