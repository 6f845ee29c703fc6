//! Builder registry - one build step per catalog entry.
//!
//! The registry is resolved once at startup; construction never runs any
//! external tool.

use std::collections::HashMap;

use crate::builder::{
    Builder, InterfaceBuilder, NinjaBuilder, Pythia8Builder, ScriptBuilder,
};

/// Registry of per-tool builders.
pub struct BuilderRegistry {
    builders: HashMap<String, Box<dyn Builder>>,
}

impl BuilderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        BuilderRegistry {
            builders: HashMap::new(),
        }
    }

    /// Registry covering every built-in catalog entry.
    pub fn builtin() -> Self {
        let mut registry = BuilderRegistry::new();

        registry.register("zlib", Box::new(ScriptBuilder::new("install-zlib.sh")));
        registry.register("hepmc", Box::new(ScriptBuilder::new("install-hepmc.sh")));
        registry.register("boost", Box::new(ScriptBuilder::new("install-boost.sh")));
        registry.register("oneloop", Box::new(ScriptBuilder::new("install-oneloop.sh")));
        registry.register("lhapdf5", Box::new(ScriptBuilder::new("install-lhapdf5.sh")));
        registry.register(
            "lhapdf6",
            Box::new(ScriptBuilder::new("install-lhapdf6.sh").with_leading_dep("boost")),
        );
        registry.register("pythia8", Box::new(Pythia8Builder::new()));
        registry.register("ninja", Box::new(NinjaBuilder::new()));
        registry.register("mg5amc_py8_interface", Box::new(InterfaceBuilder::new()));

        registry
    }

    /// Register (or replace) the builder for a tool.
    pub fn register(&mut self, name: &str, builder: Box<dyn Builder>) {
        self.builders.insert(name.to_string(), builder);
    }

    /// Get the builder for a tool.
    pub fn get(&self, name: &str) -> Option<&dyn Builder> {
        self.builders.get(name).map(|b| b.as_ref())
    }

    /// Check if a builder is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    /// Number of registered builders.
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

impl Default for BuilderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Catalog;

    #[test]
    fn test_builtin_registry_covers_builtin_catalog() {
        let registry = BuilderRegistry::builtin();
        for tool in Catalog::builtin().tools() {
            assert!(registry.contains(&tool.name), "no builder for {}", tool.name);
        }
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = BuilderRegistry::builtin();
        let before = registry.len();
        registry.register("zlib", Box::new(ScriptBuilder::new("other.sh")));
        assert_eq!(registry.len(), before);
        assert!(registry.get("zlib").is_some());
    }
}
