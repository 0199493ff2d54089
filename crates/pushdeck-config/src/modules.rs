//! Registry of modules that may be pushed.

use std::collections::BTreeSet;

/// The modules configured for deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRegistry {
    modules: BTreeSet<String>,
}

impl ModuleRegistry {
    pub fn new<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_valid_module(&self, name: &str) -> bool {
        self.modules.contains(name)
    }

    /// Returns false if the module was already registered.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.modules.insert(name.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
