//! The name registry: which per-key resources are currently published.
//!
//! Implements [`AttributeSink`], so a [`Store`](hive_store::Store) built
//! with it keeps the registry synchronized with every add and delete. The
//! registry never calls back into the store (the store invokes the sink
//! while holding its own lock).

use std::collections::BTreeSet;
use std::sync::RwLock;

use hive_store::{AttributeSink, PublishError};

/// The set of published per-key resource names.
#[derive(Default)]
pub struct AttributeRegistry {
    names: RwLock<BTreeSet<String>>,
}

impl AttributeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a resource with this name is published.
    pub fn contains(&self, name: &str) -> bool {
        self.names
            .read()
            .expect("registry lock poisoned")
            .contains(name)
    }

    /// Number of published resources.
    pub fn len(&self) -> usize {
        self.names.read().expect("registry lock poisoned").len()
    }

    /// Returns `true` if nothing is published.
    pub fn is_empty(&self) -> bool {
        self.names.read().expect("registry lock poisoned").is_empty()
    }

    /// All published names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.names
            .read()
            .expect("registry lock poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

impl AttributeSink for AttributeRegistry {
    fn publish(&self, key: &[u8]) -> Result<(), PublishError> {
        // Keys are validated printable ASCII before publication, so the
        // lossy conversion is exact.
        let name = String::from_utf8_lossy(key).into_owned();
        let mut names = self.names.write().expect("registry lock poisoned");
        if !names.insert(name.clone()) {
            return Err(PublishError::AlreadyPublished { name });
        }
        Ok(())
    }

    fn unpublish(&self, key: &[u8]) -> Result<(), PublishError> {
        let name = String::from_utf8_lossy(key).into_owned();
        let mut names = self.names.write().expect("registry lock poisoned");
        if !names.remove(&name) {
            return Err(PublishError::NotPublished { name });
        }
        Ok(())
    }
}

impl std::fmt::Debug for AttributeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeRegistry")
            .field("published", &self.len())
            .finish()
    }
}
