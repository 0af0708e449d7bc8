//! Name → schema index.
//!
//! `Schema::id` registers into the process-wide instance as a side effect. The
//! last registration under a name wins; schemas handed out earlier are not
//! affected by later registrations.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::RegistryError;
use crate::schema::{DynSchema, Schema};

#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entries: RwLock<IndexMap<String, DynSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn register(&self, name: impl Into<String>, schema: impl Schema) {
        let name = name.into();
        let previous = self.entries.write().insert(name.clone(), schema.into_dyn());
        if previous.is_some() {
            tracing::debug!(%name, "schema registration replaced");
        } else {
            tracing::debug!(%name, "schema registered");
        }
    }

    pub fn get(&self, name: &str) -> Option<DynSchema> {
        self.entries.read().get(name).cloned()
    }

    pub fn get_or_throw(&self, name: &str) -> Result<DynSchema, RegistryError> {
        self.get(name).ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool { self.entries.read().contains_key(name) }

    /// Snapshot of every entry in registration order.
    pub fn get_all(&self) -> IndexMap<String, DynSchema> { self.entries.read().clone() }

    pub fn names(&self) -> Vec<String> { self.entries.read().keys().cloned().collect() }
    pub fn len(&self) -> usize { self.entries.read().len() }
    pub fn is_empty(&self) -> bool { self.entries.read().is_empty() }

    pub fn clear(&self) {
        let mut entries = self.entries.write();
        tracing::debug!(count = entries.len(), "schema registry cleared");
        entries.clear();
    }
}

static GLOBAL: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::new);

/// The process-wide registry.
pub fn global() -> &'static SchemaRegistry { &GLOBAL }

pub fn register(name: impl Into<String>, schema: impl Schema) { GLOBAL.register(name, schema) }
pub fn get(name: &str) -> Option<DynSchema> { GLOBAL.get(name) }
pub fn get_or_throw(name: &str) -> Result<DynSchema, RegistryError> { GLOBAL.get_or_throw(name) }
pub fn has(name: &str) -> bool { GLOBAL.has(name) }
pub fn get_all() -> IndexMap<String, DynSchema> { GLOBAL.get_all() }
pub fn clear() { GLOBAL.clear() }
