//! Test utilities and mocks for unit tests.
//!
//! Only compiled for tests: provides canned `LibrarySearch` implementations
//! so resolution logic can be exercised without touching system paths.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::Tool;
use crate::resolver::LibrarySearch;

/// A searcher with a fixed hit table keyed by tool name.
#[derive(Debug, Default)]
pub struct StaticSearch {
    hits: HashMap<String, PathBuf>,
}

impl StaticSearch {
    /// A searcher that never finds anything.
    pub fn empty() -> Self {
        StaticSearch::default()
    }

    /// A searcher with a single hit.
    pub fn with_hit(tool: &str, lib_file: &Path) -> Self {
        let mut hits = HashMap::new();
        hits.insert(tool.to_string(), lib_file.to_path_buf());
        StaticSearch { hits }
    }

    /// Add a hit.
    pub fn hit(mut self, tool: &str, lib_file: &Path) -> Self {
        self.hits.insert(tool.to_string(), lib_file.to_path_buf());
        self
    }
}

impl LibrarySearch for StaticSearch {
    fn locate(&self, tool: &Tool) -> Option<PathBuf> {
        self.hits.get(&tool.name).cloned()
    }
}

/// A searcher that must never be consulted.
#[derive(Debug)]
pub struct UnreachableSearch;

impl LibrarySearch for UnreachableSearch {
    fn locate(&self, tool: &Tool) -> Option<PathBuf> {
        panic!("search invoked for `{}` where none was expected", tool.name);
    }
}
