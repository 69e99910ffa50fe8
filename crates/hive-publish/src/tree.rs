//! The attribute tree: the externally visible resource hierarchy.
//!
//! Mirrors a two-level layout: a root directory of fixed control attributes
//! (`add`, `set`, `delete`, `locked`, `collision_counter`) and an items
//! collection holding one read/write resource per live key. Reads and
//! writes of per-key resources re-enter the store under its own lock; there
//! is one generic handler pair for all items, dispatching on the resource
//! name, rather than per-entry callbacks.

use std::sync::Arc;

use tracing::debug;

use hive_store::{Store, StoreConfig};

use crate::error::{AttributeError, AttributeResult};
use crate::registry::AttributeRegistry;

/// The fixed root attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootAttribute {
    /// Write-only: `key\nvalue` payload, fails if the key exists.
    Add,
    /// Write-only: `key\nvalue` payload, replaces an existing value.
    Set,
    /// Write-only: the payload is the key to remove.
    Delete,
    /// Read-only: `"1\n"` while an iteration holds the store lock.
    Locked,
    /// Read-only: deepest collision chain observed, as decimal.
    CollisionCounter,
}

impl RootAttribute {
    /// The attribute's resource name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Set => "set",
            Self::Delete => "delete",
            Self::Locked => "locked",
            Self::CollisionCounter => "collision_counter",
        }
    }

    /// Look a root attribute up by resource name.
    pub fn from_name(name: &str) -> AttributeResult<Self> {
        match name {
            "add" => Ok(Self::Add),
            "set" => Ok(Self::Set),
            "delete" => Ok(Self::Delete),
            "locked" => Ok(Self::Locked),
            "collision_counter" => Ok(Self::CollisionCounter),
            _ => Err(AttributeError::UnknownAttribute {
                name: name.to_string(),
            }),
        }
    }

    /// All root attributes, in directory order.
    pub fn all() -> [Self; 5] {
        [
            Self::Add,
            Self::Set,
            Self::Delete,
            Self::Locked,
            Self::CollisionCounter,
        ]
    }
}

/// Split an add/set payload at the first newline byte.
///
/// Everything before the first `\n` is the key, everything after it is the
/// value (which may itself contain newlines, or be empty).
fn split_key_value(payload: &[u8]) -> AttributeResult<(&[u8], &[u8])> {
    match payload.iter().position(|&b| b == b'\n') {
        Some(pos) => Ok((&payload[..pos], &payload[pos + 1..])),
        None => Err(AttributeError::MissingSeparator),
    }
}

/// The published resource hierarchy over one store.
pub struct AttributeTree {
    store: Arc<Store>,
    registry: Arc<AttributeRegistry>,
}

impl AttributeTree {
    /// Build a store wired to a fresh registry and the tree over both.
    pub fn new(config: StoreConfig) -> Self {
        let registry = Arc::new(AttributeRegistry::new());
        let store = Arc::new(Store::with_sink(config, registry.clone()));
        Self { store, registry }
    }

    /// Build a tree over an existing registry and a store already wired to
    /// it.
    pub fn over(store: Arc<Store>, registry: Arc<AttributeRegistry>) -> Self {
        Self { store, registry }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// The name registry backing the items collection.
    pub fn registry(&self) -> &Arc<AttributeRegistry> {
        &self.registry
    }

    // -----------------------------------------------------------------------
    // Root attributes
    // -----------------------------------------------------------------------

    /// Read a root attribute's rendered contents.
    pub fn read_root(&self, attr: RootAttribute) -> AttributeResult<Vec<u8>> {
        match attr {
            RootAttribute::Locked => {
                let flag = if self.store.locked() { "1" } else { "0" };
                Ok(format!("{flag}\n").into_bytes())
            }
            RootAttribute::CollisionCounter => {
                Ok(format!("{}\n", self.store.deepest_chain()).into_bytes())
            }
            _ => Err(AttributeError::WriteOnly {
                name: attr.name().to_string(),
            }),
        }
    }

    /// Write a root attribute.
    pub fn write_root(&self, attr: RootAttribute, payload: &[u8]) -> AttributeResult<()> {
        match attr {
            RootAttribute::Add | RootAttribute::Set => {
                let (key, value) = split_key_value(payload)?;
                let allow_replace = attr == RootAttribute::Set;
                self.store.add(key, value, allow_replace)?;
                Ok(())
            }
            RootAttribute::Delete => {
                self.store.delete(payload)?;
                Ok(())
            }
            RootAttribute::Locked | RootAttribute::CollisionCounter => {
                Err(AttributeError::ReadOnly {
                    name: attr.name().to_string(),
                })
            }
        }
    }

    // -----------------------------------------------------------------------
    // Per-key items
    // -----------------------------------------------------------------------

    /// Read a per-key resource: returns the entry's current value bytes.
    pub fn read_item(&self, name: &str) -> AttributeResult<Vec<u8>> {
        if !self.registry.contains(name) {
            return Err(AttributeError::NotPublished {
                name: name.to_string(),
            });
        }
        Ok(self.store.value_of(name.as_bytes())?)
    }

    /// Write a per-key resource: replaces the entry's value with the
    /// payload.
    ///
    /// Goes through the store's value-replace path, which is exempt from the
    /// iteration-exclusivity flag; value-only updates proceed during a walk.
    pub fn write_item(&self, name: &str, payload: &[u8]) -> AttributeResult<()> {
        if !self.registry.contains(name) {
            return Err(AttributeError::NotPublished {
                name: name.to_string(),
            });
        }
        self.store.replace_value(name.as_bytes(), payload)?;
        debug!(name, value_len = payload.len(), "item written");
        Ok(())
    }

    /// All published item names, sorted.
    pub fn items(&self) -> Vec<String> {
        self.registry.names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_store::StoreError;

    fn tree() -> AttributeTree {
        AttributeTree::new(StoreConfig { min_buckets: 8 })
    }

    // -----------------------------------------------------------------------
    // Root names
    // -----------------------------------------------------------------------

    #[test]
    fn root_names_resolve() {
        for attr in RootAttribute::all() {
            assert_eq!(RootAttribute::from_name(attr.name()).unwrap(), attr);
        }
        assert!(matches!(
            RootAttribute::from_name("bogus"),
            Err(AttributeError::UnknownAttribute { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // add / set payloads
    // -----------------------------------------------------------------------

    #[test]
    fn add_parses_key_newline_value() {
        let t = tree();
        t.write_root(RootAttribute::Add, b"alpha\nvalue-1").unwrap();
        assert_eq!(t.store().get(b"alpha", 64).unwrap(), b"value-1");
        assert_eq!(t.items(), vec!["alpha"]);
    }

    #[test]
    fn value_may_contain_newlines() {
        let t = tree();
        t.write_root(RootAttribute::Add, b"k\nline1\nline2\n").unwrap();
        assert_eq!(t.store().get(b"k", 64).unwrap(), b"line1\nline2\n");
    }

    #[test]
    fn empty_value_after_separator() {
        let t = tree();
        t.write_root(RootAttribute::Add, b"k\n").unwrap();
        assert_eq!(t.store().get(b"k", 64).unwrap(), b"");
    }

    #[test]
    fn payload_without_newline_is_rejected() {
        let t = tree();
        assert!(matches!(
            t.write_root(RootAttribute::Add, b"no-separator"),
            Err(AttributeError::MissingSeparator)
        ));
    }

    #[test]
    fn add_refuses_replace_but_set_allows_it() {
        let t = tree();
        t.write_root(RootAttribute::Add, b"k\nold").unwrap();
        assert!(matches!(
            t.write_root(RootAttribute::Add, b"k\nnew"),
            Err(AttributeError::Store(StoreError::AlreadyExists { .. }))
        ));
        t.write_root(RootAttribute::Set, b"k\nnew").unwrap();
        assert_eq!(t.store().get(b"k", 64).unwrap(), b"new");
    }

    // -----------------------------------------------------------------------
    // delete
    // -----------------------------------------------------------------------

    #[test]
    fn delete_takes_raw_key_payload() {
        let t = tree();
        t.write_root(RootAttribute::Add, b"gone\nv").unwrap();
        t.write_root(RootAttribute::Delete, b"gone").unwrap();
        assert!(t.items().is_empty());
        assert!(matches!(
            t.write_root(RootAttribute::Delete, b"gone"),
            Err(AttributeError::Store(StoreError::NotFound { .. }))
        ));
    }

    // -----------------------------------------------------------------------
    // locked / collision_counter
    // -----------------------------------------------------------------------

    #[test]
    fn locked_reflects_iteration_state() {
        let t = tree();
        t.write_root(RootAttribute::Add, b"a\n1").unwrap();
        assert_eq!(t.read_root(RootAttribute::Locked).unwrap(), b"0\n");

        t.store().begin_iteration(1).unwrap();
        assert_eq!(t.read_root(RootAttribute::Locked).unwrap(), b"1\n");
        t.store().end_iteration(1).unwrap();
        assert_eq!(t.read_root(RootAttribute::Locked).unwrap(), b"0\n");
    }

    #[test]
    fn collision_counter_renders_decimal() {
        let t = AttributeTree::new(StoreConfig { min_buckets: 1 });
        t.write_root(RootAttribute::Add, b"a\n1").unwrap();
        t.write_root(RootAttribute::Add, b"b\n2").unwrap();
        assert_eq!(t.read_root(RootAttribute::CollisionCounter).unwrap(), b"2\n");
    }

    #[test]
    fn access_modes_are_enforced() {
        let t = tree();
        assert!(matches!(
            t.read_root(RootAttribute::Add),
            Err(AttributeError::WriteOnly { .. })
        ));
        assert!(matches!(
            t.write_root(RootAttribute::Locked, b"1"),
            Err(AttributeError::ReadOnly { .. })
        ));
        assert!(matches!(
            t.write_root(RootAttribute::CollisionCounter, b"0"),
            Err(AttributeError::ReadOnly { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Per-key items
    // -----------------------------------------------------------------------

    #[test]
    fn item_read_returns_value_bytes() {
        let t = tree();
        t.write_root(RootAttribute::Add, b"k\nhello").unwrap();
        assert_eq!(t.read_item("k").unwrap(), b"hello");
    }

    #[test]
    fn item_write_replaces_value_in_place() {
        let t = tree();
        t.write_root(RootAttribute::Add, b"k\nold").unwrap();
        t.write_item("k", b"replacement that is longer").unwrap();
        assert_eq!(t.read_item("k").unwrap(), b"replacement that is longer");
        // Identity unchanged: still exactly one published resource.
        assert_eq!(t.items(), vec!["k"]);
    }

    #[test]
    fn unpublished_item_is_rejected() {
        let t = tree();
        assert!(matches!(
            t.read_item("ghost"),
            Err(AttributeError::NotPublished { .. })
        ));
        assert!(matches!(
            t.write_item("ghost", b"v"),
            Err(AttributeError::NotPublished { .. })
        ));
    }

    #[test]
    fn item_write_is_allowed_during_iteration() {
        let t = tree();
        t.write_root(RootAttribute::Add, b"k\nold").unwrap();
        t.store().begin_iteration(1).unwrap();

        // Structural mutation is blocked...
        assert!(matches!(
            t.write_root(RootAttribute::Add, b"other\nv"),
            Err(AttributeError::Store(StoreError::Busy(_)))
        ));
        assert!(matches!(
            t.write_root(RootAttribute::Delete, b"k"),
            Err(AttributeError::Store(StoreError::Busy(_)))
        ));
        // ...but the per-key value path is not.
        t.write_item("k", b"new").unwrap();
        assert_eq!(t.read_item("k").unwrap(), b"new");

        t.store().end_iteration(1).unwrap();
    }

    #[test]
    fn tree_over_existing_store_and_registry() {
        let registry = Arc::new(AttributeRegistry::new());
        let store = Arc::new(Store::with_sink(
            StoreConfig { min_buckets: 8 },
            registry.clone(),
        ));
        store.add(b"pre", b"existing", false).unwrap();

        let t = AttributeTree::over(store, registry);
        assert_eq!(t.items(), vec!["pre"]);
        assert_eq!(t.read_item("pre").unwrap(), b"existing");
    }

    #[test]
    fn items_track_store_contents() {
        let t = tree();
        t.write_root(RootAttribute::Add, b"b\n2").unwrap();
        t.write_root(RootAttribute::Add, b"a\n1").unwrap();
        assert_eq!(t.items(), vec!["a", "b"]);

        t.write_root(RootAttribute::Delete, b"a").unwrap();
        assert_eq!(t.items(), vec!["b"]);

        t.store().clear();
        assert!(t.items().is_empty());
    }
}
