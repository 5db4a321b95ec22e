use std::collections::BTreeMap;

use crate::{DatabaseAdapter, Error, RawConfig, Result, canonical_key};

pub type AdapterFactory = fn(&RawConfig) -> Result<Box<dyn DatabaseAdapter>>;

/// Adapter names mapped to the functions that build them. Callers own the
/// registry; nothing registers itself globally.
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    factories: BTreeMap<String, AdapterFactory>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the factory previously registered under the same name.
    pub fn register(&mut self, name: &str, factory: AdapterFactory) -> Option<AdapterFactory> {
        self.factories.insert(canonical_key(name), factory)
    }

    pub fn lookup(&self, name: &str) -> Option<AdapterFactory> {
        self.factories.get(&canonical_key(name)).copied()
    }

    pub fn establish(&self, name: &str, config: &RawConfig) -> Result<Box<dyn DatabaseAdapter>> {
        let factory = self.lookup(name).ok_or_else(|| Error::UnknownAdapter {
            name: name.to_string(),
        })?;
        factory(config)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}
