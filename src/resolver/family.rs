//! Version-family resolution.
//!
//! Lifts `classify` over the two members of a family and applies the
//! decision table, in order. The preferred member comes from catalog data.

use std::path::Path;

use crate::core::{Catalog, Family};
use crate::error::InstallError;
use crate::resolver::{classify, LibrarySearch, Resolution};

/// Outcome of resolving a family alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilyChoice {
    /// Every member is disabled; the alias is dropped entirely.
    Dropped,

    /// A concrete member was selected.
    Selected {
        name: String,
        resolution: Resolution,
    },
}

/// Select exactly one concrete member for a family alias.
///
/// Deterministic in the catalog state: resolving twice yields the same
/// choice. Exhausting the decision table is an internal-consistency
/// failure.
pub fn resolve_family(
    catalog: &Catalog,
    family: &Family,
    prefix: &Path,
    search: &dyn LibrarySearch,
) -> Result<FamilyChoice, InstallError> {
    let members: Vec<(String, Resolution)> = family
        .members
        .iter()
        .map(|name| classify(catalog, name, prefix, search).map(|r| (name.clone(), r)))
        .collect::<Result<_, _>>()?;

    let enabled: Vec<&(String, Resolution)> = members
        .iter()
        .filter(|(_, r)| *r != Resolution::Disabled)
        .collect();

    let selected = |(name, resolution): &(String, Resolution)| FamilyChoice::Selected {
        name: name.clone(),
        resolution: resolution.clone(),
    };

    // 1. Every member vetoed: the dependency is dropped entirely.
    if enabled.is_empty() {
        return Ok(FamilyChoice::Dropped);
    }

    // 2. Only one version remains in play, whatever its status.
    if enabled.len() == 1 {
        return Ok(selected(enabled[0]));
    }

    // 3. Every candidate needs installing: the preferred member wins.
    if enabled.iter().all(|(_, r)| *r == Resolution::MustInstall) {
        return Ok(FamilyChoice::Selected {
            name: family.preferred.clone(),
            resolution: Resolution::MustInstall,
        });
    }

    // 4. Every candidate is already installed: prefer the preferred one.
    if enabled
        .iter()
        .all(|(_, r)| matches!(r, Resolution::Satisfied(_)))
    {
        let pick = enabled
            .iter()
            .find(|(name, _)| *name == family.preferred)
            .or_else(|| enabled.first())
            .expect("non-empty candidate set");
        return Ok(selected(pick));
    }

    // 5. Exactly one candidate is already installed: avoid redundant work.
    let satisfied: Vec<_> = enabled
        .iter()
        .filter(|(_, r)| matches!(r, Resolution::Satisfied(_)))
        .collect();
    if satisfied.len() == 1 {
        return Ok(selected(satisfied[0]));
    }

    Err(InstallError::InconsistentFamilyResolution {
        alias: family.alias.clone(),
    })
}
